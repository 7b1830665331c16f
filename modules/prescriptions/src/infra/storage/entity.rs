use sea_orm::entity::prelude::*;

use crate::domain::model::Prescription;

#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "prescription")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub prescription_date: Date,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    pub next_visit_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Prescription {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            prescription_date: m.prescription_date,
            name: m.name,
            age: m.age,
            gender: m.gender,
            diagnosis: m.diagnosis,
            medicines: m.medicines,
            next_visit_date: m.next_visit_date,
        }
    }
}
