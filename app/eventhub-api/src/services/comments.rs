//! Comment Service

use super::{ensure_visible, load_event, user_summaries, NotificationService};
use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::repository::Repositories;

use eventhub_auth::{AuthError, User};
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
    notifications: NotificationService,
}

impl CommentService {
    pub const DEFAULT_LIMIT: i64 = 20;

    pub fn new(repos: Repositories, notifications: NotificationService) -> Self {
        Self {
            repos,
            notifications,
        }
    }

    /// A comment of `event_id`; comments of other events are reported missing
    async fn load_comment(&self, event_id: Uuid, id: Uuid) -> ApiResult<Comment> {
        self.repos
            .comments
            .find_by_id(id)
            .await?
            .filter(|c| c.event_id == event_id)
            .ok_or_else(|| ApiError::not_found("Comment"))
    }

    pub async fn create(&self, user: &User, event_id: Uuid, req: CreateCommentRequest) -> ApiResult<CommentView> {
        let event = load_event(&self.repos, event_id).await?;
        ensure_visible(&event, Some(user))?;

        let content = req.content.trim().to_string();
        if content.is_empty() {
            return Err(ApiError::BadRequest("Comment content is required".to_string()));
        }

        let parent = match req.parent_id {
            Some(parent_id) => {
                let parent = self
                    .repos
                    .comments
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Parent comment"))?;

                if parent.event_id != event_id {
                    return Err(ApiError::BadRequest(
                        "Parent comment belongs to a different event".to_string(),
                    ));
                }
                if parent.parent_id.is_some() {
                    return Err(ApiError::BadRequest(
                        "Replies can only be made to top-level comments".to_string(),
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let comment = self
            .repos
            .comments
            .create(NewComment {
                event_id,
                user_id: user.id,
                parent_id: parent.as_ref().map(|p| p.id),
                content,
            })
            .await?;

        tracing::info!(comment_id = %comment.id, event_id = %event_id, user_id = %user.id, "Comment created");

        let notification = match &parent {
            Some(parent) if parent.user_id != user.id => Some(NewNotification::new(
                parent.user_id,
                NotificationKind::CommentReply,
                "New reply",
                format!("{} replied to your comment on \"{}\"", user.name, event.title),
            )),
            None if event.organizer_id != user.id => Some(NewNotification::new(
                event.organizer_id,
                NotificationKind::NewComment,
                "New comment",
                format!("{} commented on \"{}\"", user.name, event.title),
            )),
            _ => None,
        };
        if let Some(notification) = notification {
            self.notifications
                .notify(notification.event(event_id).comment(comment.id).from_user(user.id))
                .await;
        }

        Ok(CommentView {
            comment,
            user: Some(UserSummary::from(user)),
        })
    }

    /// Top-level comments, newest first, each with its direct replies
    pub async fn list(&self, viewer: Option<&User>, event_id: Uuid, params: PageParams) -> ApiResult<CommentPage> {
        let event = load_event(&self.repos, event_id).await?;
        ensure_visible(&event, viewer)?;

        let paging = Paging::new(params.page, params.limit, Self::DEFAULT_LIMIT);
        let (top_level, total) = self
            .repos
            .comments
            .list_top_level(event_id, paging.limit, paging.offset())
            .await?;

        let parent_ids: Vec<Uuid> = top_level.iter().map(|c| c.id).collect();
        let replies = self.repos.comments.list_replies(&parent_ids).await?;

        let authors = user_summaries(
            &self.repos,
            top_level.iter().chain(replies.iter()).map(|c| c.user_id).collect::<Vec<Uuid>>(),
        )
        .await?;
        let view = |comment: Comment| CommentView {
            user: authors.get(&comment.user_id).cloned(),
            comment,
        };

        let mut threads: Vec<CommentThread> = top_level
            .into_iter()
            .map(|comment| CommentThread {
                comment: view(comment),
                replies: Vec::new(),
            })
            .collect();

        for reply in replies {
            if let Some(thread) = threads
                .iter_mut()
                .find(|t| Some(t.comment.comment.id) == reply.parent_id)
            {
                thread.replies.push(view(reply));
            }
        }

        Ok(CommentPage {
            comments: threads,
            total,
            page: paging.page,
            total_pages: paging.total_pages(total),
            has_more: paging.has_more(total),
        })
    }

    /// Like the comment, or withdraw the like if the user already gave one
    pub async fn toggle_like(&self, user: &User, event_id: Uuid, comment_id: Uuid) -> ApiResult<(Comment, bool)> {
        let event = load_event(&self.repos, event_id).await?;
        ensure_visible(&event, Some(user))?;

        let comment = self.load_comment(event_id, comment_id).await?;

        if comment.is_liked_by(user.id) {
            let comment = self.repos.comments.remove_like(comment_id, user.id).await?;
            Ok((comment, false))
        } else {
            let comment = self.repos.comments.add_like(comment_id, user.id).await?;
            Ok((comment, true))
        }
    }

    /// Delete a comment and its replies (author, event organizer or admin)
    pub async fn delete(&self, user: &User, event_id: Uuid, comment_id: Uuid) -> ApiResult<()> {
        let event = load_event(&self.repos, event_id).await?;
        let comment = self.load_comment(event_id, comment_id).await?;

        let allowed = user.id == comment.user_id || user.id == event.organizer_id || user.is_admin();
        if !allowed {
            tracing::debug!(user_id = %user.id, comment_id = %comment_id, "Comment delete denied");
            return Err(AuthError::Forbidden(
                "Access denied. You must be the comment author, the event organizer or an admin"
                    .to_string(),
            )
            .into());
        }

        self.repos.comments.delete(comment_id).await?;
        tracing::info!(comment_id = %comment_id, user_id = %user.id, "Comment deleted");

        Ok(())
    }
}
