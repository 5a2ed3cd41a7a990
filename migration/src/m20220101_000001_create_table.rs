use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(integer(Movies::Id).primary_key())
                    .col(string_len_uniq(Movies::Title, 250))
                    .col(integer(Movies::Year))
                    .col(string_len(Movies::Description, 1000))
                    .col(double(Movies::Rating))
                    .col(integer_null(Movies::Ranking))
                    .col(string_len_null(Movies::Review, 500))
                    .col(string_len(Movies::ImgUrl, 400))
                    .col(big_integer(Movies::Seq))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_rating_seq")
                    .table(Movies::Table)
                    .col(Movies::Rating)
                    .col(Movies::Seq)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    Year,
    Description,
    Rating,
    Ranking,
    Review,
    ImgUrl,
    Seq,
}
