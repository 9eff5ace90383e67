use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::domain::entities::{
    Membership, MoveOutcome, NewPlaylistItem, PlaybackState, PlaylistDirection, PlaylistItem,
    Room, RoomRole, RoomWithMemberCount,
};
use crate::domain::repositories::{JoinOutcome, LeaveOutcome, RepositoryError, RoomRepository};

const MEMBER_ORDER: &str = "ORDER BY CASE role WHEN 'host' THEN 0 WHEN 'moderator' THEN 1 ELSE 2 END, joined_at, id";

/// SQLite implementation of RoomRepository
pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_room(row: &SqliteRow) -> Room {
        Room {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            is_public: row.get("is_public"),
            password_hash: row.get("password_hash"),
            max_members: row.get::<i64, _>("max_members") as u32,
            host_id: row.get("host_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_membership(row: &SqliteRow) -> Membership {
        let role_str: String = row.get("role");

        Membership {
            id: row.get("id"),
            room_id: row.get("room_id"),
            user_id: row.get("user_id"),
            role: RoomRole::from_str(&role_str).unwrap_or(RoomRole::Member),
            joined_at: row.get("joined_at"),
        }
    }

    fn row_to_item(row: &SqliteRow) -> PlaylistItem {
        PlaylistItem {
            id: row.get("id"),
            room_id: row.get("room_id"),
            added_by: row.get("added_by"),
            video_id: row.get("video_id"),
            title: row.get("title"),
            thumbnail: row.get("thumbnail"),
            duration: row.get::<i64, _>("duration") as u32,
            position: row.get::<i64, _>("position") as u32,
            added_at: row.get("added_at"),
        }
    }

    fn row_to_playback(row: &SqliteRow) -> PlaybackState {
        PlaybackState {
            room_id: row.get("room_id"),
            video_id: row.get("video_id"),
            elapsed_seconds: row.get("elapsed_seconds"),
            is_playing: row.get("is_playing"),
            playback_rate: row.get("playback_rate"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Translate driver errors. Busy/locked means a concurrent writer won the race.
fn map_db_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::AlreadyExists(db_err.message().to_string());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound("Room".to_string());
        }
        // SQLITE_BUSY, SQLITE_LOCKED and their extended codes
        if let Some(code) = db_err.code() {
            if matches!(code.as_ref(), "5" | "6" | "261" | "262" | "517" | "773") {
                return RepositoryError::Conflict(db_err.message().to_string());
            }
        }
    }
    RepositoryError::Database(err.to_string())
}

/// Remove a room and its dependents on an open transaction
async fn delete_room_rows(conn: &mut SqliteConnection, room_id: &str) -> Result<bool, sqlx::Error> {
    for table in ["playback_states", "playlist_items", "room_members"] {
        sqlx::query(&format!("DELETE FROM {} WHERE room_id = ?", table))
            .bind(room_id)
            .execute(&mut *conn)
            .await?;
    }

    let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(room_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn count_members_on(conn: &mut SqliteConnection, room_id: &str) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM room_members WHERE room_id = ?")
        .bind(room_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.get("count"))
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    // ========== Room operations ==========

    async fn find_room(&self, id: &str) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.as_ref().map(Self::row_to_room))
    }

    async fn find_public_rooms(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RoomWithMemberCount>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT r.*, COUNT(m.id) AS member_count
            FROM rooms r
            LEFT JOIN room_members m ON m.room_id = r.id
            WHERE r.is_public = 1
            GROUP BY r.id
            ORDER BY r.created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows
            .iter()
            .map(|row| RoomWithMemberCount {
                room: Self::row_to_room(row),
                member_count: row.get::<i64, _>("member_count") as usize,
            })
            .collect())
    }

    async fn create_room(
        &self,
        room: &Room,
        host: &Membership,
        playback: &PlaybackState,
    ) -> Result<Membership, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        sqlx::query(
            r#"
            INSERT INTO rooms (id, name, description, is_public, password_hash, max_members, host_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&room.id)
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.is_public)
        .bind(&room.password_hash)
        .bind(room.max_members as i64)
        .bind(&room.host_id)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        let result = sqlx::query(
            "INSERT INTO room_members (room_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&host.room_id)
        .bind(&host.user_id)
        .bind(host.role.as_str())
        .bind(host.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        sqlx::query(
            r#"
            INSERT INTO playback_states (room_id, video_id, elapsed_seconds, is_playing, playback_rate, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&playback.room_id)
        .bind(&playback.video_id)
        .bind(playback.elapsed_seconds)
        .bind(playback.is_playing)
        .bind(playback.playback_rate)
        .bind(playback.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(Membership {
            id: result.last_insert_rowid(),
            ..host.clone()
        })
    }

    async fn update_room(&self, room: &Room) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET name = ?, description = ?, is_public = ?, password_hash = ?, max_members = ?, host_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.is_public)
        .bind(&room.password_hash)
        .bind(room.max_members as i64)
        .bind(&room.host_id)
        .bind(room.updated_at)
        .bind(&room.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Room".to_string()));
        }
        Ok(())
    }

    async fn delete_room(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let deleted = delete_room_rows(&mut tx, id).await.map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;
        Ok(deleted)
    }

    // ========== Membership operations ==========

    async fn find_membership(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(room_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.as_ref().map(Self::row_to_membership))
    }

    async fn list_members(&self, room_id: &str) -> Result<Vec<Membership>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT * FROM room_members WHERE room_id = ? {}",
            MEMBER_ORDER
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(Self::row_to_membership).collect())
    }

    async fn count_members(&self, room_id: &str) -> Result<usize, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_db_err)?;
        let count = count_members_on(&mut conn, room_id)
            .await
            .map_err(map_db_err)?;
        Ok(count as usize)
    }

    async fn insert_member_with_capacity(
        &self,
        membership: &Membership,
    ) -> Result<JoinOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let room = sqlx::query("SELECT max_members FROM rooms WHERE id = ?")
            .bind(&membership.room_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let max_members: i64 = match room {
            Some(row) => row.get("max_members"),
            None => return Ok(JoinOutcome::RoomMissing),
        };

        let existing = sqlx::query("SELECT id FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(&membership.room_id)
            .bind(&membership.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Ok(JoinOutcome::AlreadyMember);
        }

        let count = count_members_on(&mut tx, &membership.room_id)
            .await
            .map_err(map_db_err)?;
        if count >= max_members {
            return Ok(JoinOutcome::Full);
        }

        let result = sqlx::query(
            "INSERT INTO room_members (room_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&membership.room_id)
        .bind(&membership.user_id)
        .bind(membership.role.as_str())
        .bind(membership.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(JoinOutcome::Joined {
            membership: Membership {
                id: result.last_insert_rowid(),
                ..membership.clone()
            },
            member_count: count as usize + 1,
        })
    }

    async fn remove_member(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<LeaveOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query("SELECT * FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(room_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let leaving = match row {
            Some(row) => Self::row_to_membership(&row),
            None => return Ok(LeaveOutcome::NotMember),
        };

        if !leaving.is_host() {
            sqlx::query("DELETE FROM room_members WHERE id = ?")
                .bind(leaving.id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
            tx.commit().await.map_err(map_db_err)?;
            return Ok(LeaveOutcome::Left);
        }

        let successor = sqlx::query(
            "SELECT * FROM room_members WHERE room_id = ? AND id != ? ORDER BY joined_at, id LIMIT 1",
        )
        .bind(room_id)
        .bind(leaving.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;

        let Some(successor) = successor.as_ref().map(Self::row_to_membership) else {
            delete_room_rows(&mut tx, room_id)
                .await
                .map_err(map_db_err)?;
            tx.commit().await.map_err(map_db_err)?;
            return Ok(LeaveOutcome::RoomDeleted);
        };

        // Old host row goes first so the single-host index never sees two
        sqlx::query("DELETE FROM room_members WHERE id = ?")
            .bind(leaving.id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("UPDATE room_members SET role = 'host' WHERE id = ?")
            .bind(successor.id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("UPDATE rooms SET host_id = ?, updated_at = ? WHERE id = ?")
            .bind(&successor.user_id)
            .bind(chrono::Utc::now().timestamp_millis())
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(LeaveOutcome::HostTransferred {
            new_host: Membership {
                role: RoomRole::Host,
                ..successor
            },
        })
    }

    async fn update_member_role(
        &self,
        room_id: &str,
        user_id: &str,
        role: RoomRole,
    ) -> Result<Option<Membership>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let result = sqlx::query("UPDATE room_members SET role = ? WHERE room_id = ? AND user_id = ?")
            .bind(role.as_str())
            .bind(room_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(room_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(Some(Self::row_to_membership(&row)))
    }

    // ========== Playlist operations ==========

    async fn list_playlist(&self, room_id: &str) -> Result<Vec<PlaylistItem>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM playlist_items WHERE room_id = ? ORDER BY position ASC")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(rows.iter().map(Self::row_to_item).collect())
    }

    async fn find_playlist_item(
        &self,
        id: &str,
    ) -> Result<Option<PlaylistItem>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM playlist_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.as_ref().map(Self::row_to_item))
    }

    async fn append_playlist_item(
        &self,
        item: NewPlaylistItem,
    ) -> Result<PlaylistItem, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query(
            "SELECT COALESCE(MAX(position), -1) + 1 AS next_position FROM playlist_items WHERE room_id = ?",
        )
        .bind(&item.room_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;
        let next_position: i64 = row.get("next_position");

        let item = item.at_position(next_position as u32);

        sqlx::query(
            r#"
            INSERT INTO playlist_items (id, room_id, added_by, video_id, title, thumbnail, duration, position, added_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.room_id)
        .bind(&item.added_by)
        .bind(&item.video_id)
        .bind(&item.title)
        .bind(&item.thumbnail)
        .bind(item.duration as i64)
        .bind(item.position as i64)
        .bind(item.added_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(item)
    }

    async fn remove_playlist_item(
        &self,
        room_id: &str,
        item_id: &str,
    ) -> Result<Option<PlaylistItem>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query("SELECT * FROM playlist_items WHERE id = ? AND room_id = ?")
            .bind(item_id)
            .bind(room_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let Some(removed) = row.as_ref().map(Self::row_to_item) else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM playlist_items WHERE id = ?")
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query(
            "UPDATE playlist_items SET position = position - 1 WHERE room_id = ? AND position > ?",
        )
        .bind(room_id)
        .bind(removed.position as i64)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(Some(removed))
    }

    async fn move_playlist_item(
        &self,
        room_id: &str,
        item_id: &str,
        new_position: i64,
    ) -> Result<MoveOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query("SELECT * FROM playlist_items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let item = match row.as_ref().map(Self::row_to_item) {
            Some(item) if item.room_id == room_id => item,
            Some(_) => return Ok(MoveOutcome::WrongRoom),
            None => return Ok(MoveOutcome::Missing),
        };

        let row = sqlx::query("SELECT COUNT(*) AS count FROM playlist_items WHERE room_id = ?")
            .bind(room_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let count: i64 = row.get("count");

        if new_position < 0 || new_position >= count {
            return Ok(MoveOutcome::OutOfRange {
                count: count as u32,
            });
        }

        let old_position = item.position as i64;
        if new_position == old_position {
            return Ok(MoveOutcome::Unchanged(item));
        }

        if new_position > old_position {
            sqlx::query(
                "UPDATE playlist_items SET position = position - 1 WHERE room_id = ? AND position > ? AND position <= ?",
            )
            .bind(room_id)
            .bind(old_position)
            .bind(new_position)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        } else {
            sqlx::query(
                "UPDATE playlist_items SET position = position + 1 WHERE room_id = ? AND position >= ? AND position < ?",
            )
            .bind(room_id)
            .bind(new_position)
            .bind(old_position)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        sqlx::query("UPDATE playlist_items SET position = ? WHERE id = ?")
            .bind(new_position)
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        let rows = sqlx::query("SELECT * FROM playlist_items WHERE room_id = ? ORDER BY position ASC")
            .bind(room_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let playlist = rows.iter().map(Self::row_to_item).collect();

        tx.commit().await.map_err(map_db_err)?;

        Ok(MoveOutcome::Moved {
            item: PlaylistItem {
                position: new_position as u32,
                ..item
            },
            playlist,
        })
    }

    async fn find_adjacent_item(
        &self,
        room_id: &str,
        position: i64,
        direction: PlaylistDirection,
    ) -> Result<Option<PlaylistItem>, RepositoryError> {
        let sql = match direction {
            PlaylistDirection::Next => {
                "SELECT * FROM playlist_items WHERE room_id = ? AND position > ? ORDER BY position ASC LIMIT 1"
            }
            PlaylistDirection::Previous => {
                "SELECT * FROM playlist_items WHERE room_id = ? AND position < ? ORDER BY position DESC LIMIT 1"
            }
        };

        let row = sqlx::query(sql)
            .bind(room_id)
            .bind(position)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.as_ref().map(Self::row_to_item))
    }

    // ========== Playback operations ==========

    async fn get_playback(&self, room_id: &str) -> Result<Option<PlaybackState>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM playback_states WHERE room_id = ?")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.as_ref().map(Self::row_to_playback))
    }

    async fn save_playback(&self, state: &PlaybackState) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE playback_states
            SET video_id = ?, elapsed_seconds = ?, is_playing = ?, playback_rate = ?, updated_at = ?
            WHERE room_id = ?
            "#,
        )
        .bind(&state.video_id)
        .bind(state.elapsed_seconds)
        .bind(state.is_playing)
        .bind(state.playback_rate)
        .bind(state.updated_at)
        .bind(&state.room_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Playback state".to_string()));
        }
        Ok(())
    }
}
