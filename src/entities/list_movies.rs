use sea_orm::entity::prelude::*;

/// Join rows linking a list to its movies, ordered by `position`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "list_movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub list_id: i32,

    pub movie_id: i32,

    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
