use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{conversations, messages};

#[derive(Debug)]
pub enum ConversationOutcome {
    Created(conversations::Model),
    Existing(conversations::Model),
}

pub struct MessageRepository {
    conn: DatabaseConnection,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Conversations the user participates in, most recently active
    /// first.
    pub async fn list_conversations(&self, user_id: i32) -> Result<Vec<conversations::Model>> {
        let conversations = conversations::Entity::find()
            .filter(
                Condition::any()
                    .add(conversations::Column::UserA.eq(user_id))
                    .add(conversations::Column::UserB.eq(user_id)),
            )
            .order_by_desc(conversations::Column::UpdatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list conversations")?;

        Ok(conversations)
    }

    pub async fn get_conversation(&self, id: i32) -> Result<Option<conversations::Model>> {
        let conversation = conversations::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query conversation")?;

        Ok(conversation)
    }

    /// Returns the existing conversation between the two users or
    /// creates one. The pair is normalized so the caller order does not
    /// matter.
    pub async fn find_or_create_conversation(
        &self,
        user_one: i32,
        user_two: i32,
    ) -> Result<ConversationOutcome> {
        let (user_a, user_b) = (user_one.min(user_two), user_one.max(user_two));

        let existing = conversations::Entity::find()
            .filter(conversations::Column::UserA.eq(user_a))
            .filter(conversations::Column::UserB.eq(user_b))
            .one(&self.conn)
            .await
            .context("Failed to query conversation by participants")?;

        if let Some(conversation) = existing {
            return Ok(ConversationOutcome::Existing(conversation));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let active = conversations::ActiveModel {
            user_a: Set(user_a),
            user_b: Set(user_b),
            last_message_id: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create conversation")?;

        Ok(ConversationOutcome::Created(model))
    }

    pub async fn list_messages(&self, conversation_id: i32) -> Result<Vec<messages::Model>> {
        let messages = messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .order_by_asc(messages::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list messages")?;

        Ok(messages)
    }

    /// Append a message and move the conversation to the top of its
    /// participants' lists.
    pub async fn send(
        &self,
        conversation_id: i32,
        sender_id: i32,
        content: &str,
    ) -> Result<messages::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = messages::ActiveModel {
            conversation_id: Set(conversation_id),
            sender_id: Set(sender_id),
            content: Set(content.to_string()),
            created_at: Set(now.clone()),
            ..Default::default()
        };

        let message = active
            .insert(&self.conn)
            .await
            .context("Failed to create message")?;

        let conversation = self
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Conversation not found: {conversation_id}"))?;

        let mut active: conversations::ActiveModel = conversation.into();
        active.last_message_id = Set(Some(message.id));
        active.updated_at = Set(now);
        active
            .update(&self.conn)
            .await
            .context("Failed to update conversation")?;

        Ok(message)
    }
}
