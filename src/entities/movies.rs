use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub title: String,

    pub description: Option<String>,

    /// Full-size artwork object key
    pub image: Option<String>,

    /// Title-card artwork object key
    pub image_title: Option<String>,

    /// Thumbnail artwork object key
    pub image_small: Option<String>,

    /// Short preview clip object key
    pub preview: Option<String>,

    /// Full video object key
    pub video: Option<String>,

    pub year: Option<String>,

    /// Age rating, e.g. "16"
    pub age_limit: Option<String>,

    pub genre: Option<String>,

    pub is_series: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
