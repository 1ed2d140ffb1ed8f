use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bloqueo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub fecha: DateTime,

    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub departamento: String,

    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub placa: String,

    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub barcode: String,

    #[sea_orm(column_type = "String(StringLen::N(10))")]
    pub pin: String,

    #[sea_orm(column_type = "Text")]
    pub motivo: String,

    pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
