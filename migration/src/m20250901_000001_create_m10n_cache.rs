use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum M10nCache {
    Table,
    Cid,
    Data,
    Tags,
    Expire,
    Created,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(M10nCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(M10nCache::Cid)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(M10nCache::Data).text().not_null())
                    // 以空格分隔并首尾补空格，便于按标签 LIKE 匹配
                    .col(
                        ColumnDef::new(M10nCache::Tags)
                            .text()
                            .not_null()
                            .default(" "),
                    )
                    .col(
                        ColumnDef::new(M10nCache::Expire)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(M10nCache::Created)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_m10n_cache_expire")
                    .table(M10nCache::Table)
                    .col(M10nCache::Expire)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(M10nCache::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
