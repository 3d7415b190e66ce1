//! In-memory repositories for tests
//!
//! One store implements every repository trait so cascades between tables
//! behave like the foreign keys in `migrations/`.

use super::{CommentRepository, EventRepository, NotificationRepository, RsvpRepository};
use crate::error::{ApiError, ApiResult};
use crate::models::*;

use async_trait::async_trait;
use chrono::Utc;
use eventhub_auth::{AuthError, NewUser, Role, User, UserChanges, UserQuery, UserStore};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<Event>,
    rsvps: Vec<Rsvp>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn drop_event_children(&mut self, event_ids: &[Uuid]) {
        self.rsvps.retain(|r| !event_ids.contains(&r.event_id));
        self.comments.retain(|c| !event_ids.contains(&c.event_id));
        for n in &mut self.notifications {
            if n.related_event_id.is_some_and(|id| event_ids.contains(&id)) {
                n.related_event_id = None;
            }
        }
    }

    fn drop_comments(&mut self, ids: &[Uuid]) {
        self.comments
            .retain(|c| !ids.contains(&c.id) && !c.parent_id.is_some_and(|p| ids.contains(&p)));
        for n in &mut self.notifications {
            if n.related_comment_id.is_some_and(|id| ids.contains(&id)) {
                n.related_comment_id = None;
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn page<T: Clone>(items: &[T], limit: i64, offset: i64) -> Vec<T> {
    items
        .iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

// ============================================
// Users
// ============================================

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, AuthError> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email == new.email) {
            return Err(AuthError::EmailExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            avatar_url: None,
            bio: None,
            roles: vec![Role::Attendee],
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AuthError> {
        let mut tables = self.tables();
        if let Some(email) = &changes.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(AuthError::EmailExists);
            }
        }

        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(email) = changes.email {
                user.email = email;
            }
            if changes.avatar_url.is_some() {
                user.avatar_url = changes.avatar_url;
            }
            if changes.bio.is_some() {
                user.bio = changes.bio;
            }
            if let Some(roles) = changes.roles {
                user.roles = roles;
            }
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> Result<(), AuthError> {
        if let Some(user) = self.tables().users.iter_mut().find(|u| u.id == id) {
            user.refresh_token_hash = hash;
        }
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> Result<(Vec<User>, i64), AuthError> {
        let needle = query.q.as_deref().map(str::to_lowercase);
        let mut users: Vec<User> = self
            .tables()
            .users
            .iter()
            .filter(|u| {
                needle.as_deref().map_or(true, |q| {
                    u.name.to_lowercase().contains(q) || u.email.to_lowercase().contains(q)
                })
            })
            .filter(|u| query.role.map_or(true, |role| u.roles.contains(&role)))
            .cloned()
            .collect();

        match query.sort_column() {
            "email" => users.sort_by(|a, b| a.email.cmp(&b.email)),
            "created_at" => users.sort_by_key(|u| u.created_at),
            _ => users.sort_by(|a, b| a.name.cmp(&b.name)),
        }

        let total = users.len() as i64;
        Ok((page(&users, query.limit(), query.offset()), total))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthError> {
        let mut tables = self.tables();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        let organized: Vec<Uuid> = tables
            .events
            .iter()
            .filter(|e| e.organizer_id == id)
            .map(|e| e.id)
            .collect();
        tables.events.retain(|e| e.organizer_id != id);
        tables.drop_event_children(&organized);

        let authored: Vec<Uuid> = tables
            .comments
            .iter()
            .filter(|c| c.user_id == id)
            .map(|c| c.id)
            .collect();
        tables.drop_comments(&authored);
        tables.rsvps.retain(|r| r.user_id != id);
        tables.notifications.retain(|n| n.user_id != id);
        for n in &mut tables.notifications {
            if n.related_user_id == Some(id) {
                n.related_user_id = None;
            }
        }
        Ok(true)
    }
}

// ============================================
// Events
// ============================================

fn matches_text(event: &Event, text: &str) -> bool {
    let haystack = format!("{} {} {}", event.title, event.description, event.location).to_lowercase();
    text.split_whitespace()
        .all(|word| haystack.contains(&word.to_lowercase()))
}

fn visible(visibility: Visibility, event: &Event) -> bool {
    match visibility {
        Visibility::Everything => true,
        Visibility::PublicOnly => !event.is_private,
        Visibility::PublicOrOrganizedBy(id) => !event.is_private || event.organizer_id == id,
    }
}

fn matches_filter(event: &Event, filter: &EventFilter) -> bool {
    visible(filter.visibility, event)
        && filter.text.as_deref().map_or(true, |text| matches_text(event, text))
        && (filter.tags.is_empty() || filter.tags.iter().any(|t| event.tags.contains(t)))
        && filter.from.map_or(true, |from| event.start_at >= from)
        && filter.to.map_or(true, |to| event.start_at <= to)
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, organizer_id: Uuid, draft: &EventDraft) -> ApiResult<Event> {
        let mut tables = self.tables();
        if !tables.users.iter().any(|u| u.id == organizer_id) {
            return Err(ApiError::BadRequest("Organizer does not exist".to_string()));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_at: draft.start_at,
            end_at: draft.end_at,
            location: draft.location.clone(),
            is_online: draft.is_online,
            online_url: draft.online_url.clone(),
            organizer_id,
            capacity: draft.capacity,
            is_private: draft.is_private,
            tags: draft.tags.clone(),
            cover_image: draft.cover_image.clone(),
            status: draft.status,
            attendees_count: 0,
            maybes_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Event>> {
        Ok(self.tables().events.iter().find(|e| e.id == id).cloned())
    }

    async fn update(&self, id: Uuid, draft: &EventDraft) -> ApiResult<Option<Event>> {
        let mut tables = self.tables();
        Ok(tables.events.iter_mut().find(|e| e.id == id).map(|event| {
            event.title = draft.title.clone();
            event.description = draft.description.clone();
            event.start_at = draft.start_at;
            event.end_at = draft.end_at;
            event.location = draft.location.clone();
            event.is_online = draft.is_online;
            event.online_url = draft.online_url.clone();
            event.capacity = draft.capacity;
            event.is_private = draft.is_private;
            event.tags = draft.tags.clone();
            event.cover_image = draft.cover_image.clone();
            event.status = draft.status;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let mut tables = self.tables();
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        let deleted = tables.events.len() < before;
        if deleted {
            tables.drop_event_children(&[id]);
        }
        Ok(deleted)
    }

    async fn search(&self, filter: &EventFilter) -> ApiResult<(Vec<Event>, i64)> {
        let mut events: Vec<Event> = self
            .tables()
            .events
            .iter()
            .filter(|e| matches_filter(e, filter))
            .cloned()
            .collect();

        match filter.sort {
            EventSort::StartAt => events.sort_by_key(|e| (e.start_at, e.id)),
            EventSort::EndAt => events.sort_by_key(|e| (e.end_at, e.id)),
            EventSort::CreatedAt => events.sort_by_key(|e| (e.created_at, e.id)),
            EventSort::Title => events.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id))),
        }

        let total = events.len() as i64;
        Ok((page(&events, filter.limit, filter.offset), total))
    }

    async fn set_counts(&self, id: Uuid, attending: i64, maybe: i64) -> ApiResult<()> {
        if let Some(event) = self.tables().events.iter_mut().find(|e| e.id == id) {
            event.attendees_count = i32::try_from(attending).unwrap_or(i32::MAX);
            event.maybes_count = i32::try_from(maybe).unwrap_or(i32::MAX);
        }
        Ok(())
    }
}

// ============================================
// RSVPs
// ============================================

#[async_trait]
impl RsvpRepository for MemoryStore {
    async fn upsert(&self, event_id: Uuid, user_id: Uuid, status: RsvpStatus) -> ApiResult<(Rsvp, bool)> {
        let mut tables = self.tables();
        let now = Utc::now();

        if let Some(rsvp) = tables
            .rsvps
            .iter_mut()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
        {
            rsvp.status = status;
            rsvp.updated_at = now;
            return Ok((rsvp.clone(), false));
        }

        let rsvp = Rsvp {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status,
            created_at: now,
            updated_at: now,
        };
        tables.rsvps.push(rsvp.clone());
        Ok((rsvp, true))
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Rsvp>> {
        Ok(self.tables().rsvps.iter().find(|r| r.id == id).cloned())
    }

    async fn find_for_user(&self, event_id: Uuid, user_id: Uuid) -> ApiResult<Option<Rsvp>> {
        Ok(self
            .tables()
            .rsvps
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .cloned())
    }

    async fn list_for_event(&self, event_id: Uuid) -> ApiResult<Vec<Rsvp>> {
        Ok(self
            .tables()
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let mut tables = self.tables();
        let before = tables.rsvps.len();
        tables.rsvps.retain(|r| r.id != id);
        Ok(tables.rsvps.len() < before)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Uuid>> {
        let mut tables = self.tables();
        let event_ids = tables
            .rsvps
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.event_id)
            .collect();
        tables.rsvps.retain(|r| r.user_id != user_id);
        Ok(event_ids)
    }

    async fn counts(&self, event_id: Uuid) -> ApiResult<RsvpCounts> {
        Ok(RsvpCounts::fold(
            self.tables()
                .rsvps
                .iter()
                .filter(|r| r.event_id == event_id)
                .map(|r| (r.status, 1)),
        ))
    }
}

// ============================================
// Comments
// ============================================

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, new: NewComment) -> ApiResult<Comment> {
        let mut tables = self.tables();
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            user_id: new.user_id,
            parent_id: new.parent_id,
            content: new.content,
            likes: 0,
            liked_by: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Comment>> {
        Ok(self.tables().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_top_level(&self, event_id: Uuid, limit: i64, offset: i64) -> ApiResult<(Vec<Comment>, i64)> {
        let mut comments: Vec<Comment> = self
            .tables()
            .comments
            .iter()
            .filter(|c| c.event_id == event_id && c.parent_id.is_none())
            .cloned()
            .collect();
        // Insertion order breaks timestamp ties
        comments.reverse();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = comments.len() as i64;
        Ok((page(&comments, limit, offset), total))
    }

    async fn list_replies(&self, parent_ids: &[Uuid]) -> ApiResult<Vec<Comment>> {
        let mut replies: Vec<Comment> = self
            .tables()
            .comments
            .iter()
            .filter(|c| c.parent_id.is_some_and(|p| parent_ids.contains(&p)))
            .cloned()
            .collect();
        replies.sort_by_key(|c| c.created_at);
        Ok(replies)
    }

    async fn add_like(&self, id: Uuid, user_id: Uuid) -> ApiResult<Comment> {
        let mut tables = self.tables();
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("Comment"))?;

        if comment.is_liked_by(user_id) {
            return Err(ApiError::Conflict("You have already liked this comment".to_string()));
        }
        comment.liked_by.push(user_id);
        comment.likes += 1;
        Ok(comment.clone())
    }

    async fn remove_like(&self, id: Uuid, user_id: Uuid) -> ApiResult<Comment> {
        let mut tables = self.tables();
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("Comment"))?;

        if !comment.is_liked_by(user_id) {
            return Err(ApiError::BadRequest("You have not liked this comment".to_string()));
        }
        comment.liked_by.retain(|u| *u != user_id);
        comment.likes = (comment.likes - 1).max(0);
        Ok(comment.clone())
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let mut tables = self.tables();
        let exists = tables.comments.iter().any(|c| c.id == id);
        if exists {
            tables.drop_comments(&[id]);
        }
        Ok(exists)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<u64> {
        let mut tables = self.tables();
        let authored: Vec<Uuid> = tables
            .comments
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id)
            .collect();
        tables.drop_comments(&authored);
        Ok(authored.len() as u64)
    }
}

// ============================================
// Notifications
// ============================================

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create(&self, new: NewNotification) -> ApiResult<Notification> {
        let mut tables = self.tables();
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            is_read: false,
            related_event_id: new.related_event_id,
            related_comment_id: new.related_comment_id,
            related_user_id: new.related_user_id,
            created_at: now,
            updated_at: now,
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Notification>> {
        Ok(self.tables().notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64, offset: i64) -> ApiResult<(Vec<Notification>, i64)> {
        let mut notifications: Vec<Notification> = self
            .tables()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.reverse();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = notifications.len() as i64;
        Ok((page(&notifications, limit, offset), total))
    }

    async fn unread_count(&self, user_id: Uuid) -> ApiResult<i64> {
        Ok(self
            .tables()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> ApiResult<u64> {
        let mut marked = 0;
        for n in self.tables().notifications.iter_mut() {
            if n.user_id == user_id && !n.is_read && ids.contains(&n.id) {
                n.is_read = true;
                n.updated_at = Utc::now();
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let mut tables = self.tables();
        let before = tables.notifications.len();
        tables.notifications.retain(|n| n.id != id);
        Ok(tables.notifications.len() < before)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<u64> {
        let mut tables = self.tables();
        let before = tables.notifications.len();
        tables.notifications.retain(|n| n.user_id != user_id);
        Ok((before - tables.notifications.len()) as u64)
    }
}
