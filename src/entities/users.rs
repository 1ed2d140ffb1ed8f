use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, column_type = "String(StringLen::N(80))")]
    pub username: String,

    /// Argon2id PHC string, never the plaintext password
    #[sea_orm(column_name = "password")]
    pub password_hash: String,

    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bloqueos::Entity")]
    Bloqueos,
}

impl Related<super::bloqueos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bloqueos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
