use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Sessions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(LoginAttempts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Posts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(PostReplies)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(PostVotes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Jobs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(JobApplications)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Freelancers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(FreelancerReviews)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Conversations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Messages)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // The rate limiter and the retention sweep both scan attempts by
        // identifier/ip within a time window.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_login_attempts_identifier_created")
                    .table(LoginAttempts)
                    .col(crate::entities::login_attempts::Column::Identifier)
                    .col(crate::entities::login_attempts::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_login_attempts_ip_created")
                    .table(LoginAttempts)
                    .col(crate::entities::login_attempts::Column::IpAddress)
                    .col(crate::entities::login_attempts::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_expires_at")
                    .table(Sessions)
                    .col(crate::entities::sessions::Column::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_post_votes_post_user")
                    .table(PostVotes)
                    .col(crate::entities::post_votes::Column::PostId)
                    .col(crate::entities::post_votes::Column::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_applications_job_applicant")
                    .table(JobApplications)
                    .col(crate::entities::job_applications::Column::JobId)
                    .col(crate::entities::job_applications::Column::ApplicantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_freelancer_reviews_freelancer_reviewer")
                    .table(FreelancerReviews)
                    .col(crate::entities::freelancer_reviews::Column::FreelancerId)
                    .col(crate::entities::freelancer_reviews::Column::ReviewerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversations_participants")
                    .table(Conversations)
                    .col(crate::entities::conversations::Column::UserA)
                    .col(crate::entities::conversations::Column::UserB)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Conversations).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FreelancerReviews).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Freelancers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobApplications).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostVotes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostReplies).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoginAttempts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
