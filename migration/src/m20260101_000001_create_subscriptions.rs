use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::ChannelId).string().not_null())
                    .col(ColumnDef::new(Subscriptions::TopicUrl).string().not_null())
                    .col(ColumnDef::new(Subscriptions::CallbackUrl).string().not_null())
                    .col(ColumnDef::new(Subscriptions::HubUrl).string().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::LeaseSeconds)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Subscriptions::Secret).string())
                    .col(ColumnDef::new(Subscriptions::LastVerifiedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One subscription per (channel, callback)
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_channel_callback")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::ChannelId)
                    .col(Subscriptions::CallbackUrl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_status_expires")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::Status)
                    .col(Subscriptions::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_topic")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::TopicUrl)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    ChannelId,
    TopicUrl,
    CallbackUrl,
    HubUrl,
    LeaseSeconds,
    ExpiresAt,
    Status,
    Secret,
    LastVerifiedAt,
    CreatedAt,
    UpdatedAt,
}
