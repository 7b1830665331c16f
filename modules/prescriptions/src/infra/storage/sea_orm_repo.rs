use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ItemsAndPagesNumber,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::error::DomainError;
use crate::domain::model::{
    DailyCount, DateRange, NewPrescription, Page, PageRequest, Prescription, PrescriptionEdit,
};
use crate::domain::repo::PrescriptionRepository;
use crate::infra::storage::entity::{ActiveModel, Column, Entity};

/// ORM-based implementation of the `PrescriptionRepository` trait.
#[derive(Clone)]
pub struct SeaOrmPrescriptionRepository {
    db: DatabaseConnection,
}

impl SeaOrmPrescriptionRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PrescriptionRepository for SeaOrmPrescriptionRepository {
    async fn insert(&self, new: NewPrescription) -> Result<Prescription, DomainError> {
        let m = ActiveModel {
            id: NotSet,
            prescription_date: Set(new.prescription_date),
            name: Set(new.name),
            age: Set(new.age),
            gender: Set(new.gender),
            diagnosis: Set(new.diagnosis),
            medicines: Set(new.medicines),
            next_visit_date: Set(new.next_visit_date),
        };
        Ok(m.insert(&self.db).await?.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Prescription>, DomainError> {
        let found = Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(Into::into))
    }

    async fn update(
        &self,
        id: i64,
        edit: PrescriptionEdit,
    ) -> Result<Option<Prescription>, DomainError> {
        let Some(existing) = Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut m: ActiveModel = existing.into();
        m.name = Set(edit.name);
        m.age = Set(edit.age);
        m.gender = Set(edit.gender);
        m.diagnosis = Set(edit.diagnosis);
        m.medicines = Set(edit.medicines);
        m.next_visit_date = Set(edit.next_visit_date);

        Ok(Some(m.update(&self.db).await?.into()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let res = Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn list(
        &self,
        page: PageRequest,
        range: Option<DateRange>,
    ) -> Result<Page<Prescription>, DomainError> {
        let mut query = Entity::find().order_by_asc(Column::Id);
        if let Some(range) = range {
            query = query.filter(Column::PrescriptionDate.between(range.start(), range.end()));
        }

        let paginator = query.paginate(&self.db, page.size());
        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator.num_items_and_pages().await?;
        let rows = paginator.fetch_page(page.index()).await?;

        Ok(Page {
            content: rows.into_iter().map(Into::into).collect(),
            page: page.page(),
            size: page.size(),
            total_elements: number_of_items,
            total_pages: number_of_pages,
        })
    }

    async fn daily_counts(&self) -> Result<Vec<DailyCount>, DomainError> {
        let rows: Vec<(NaiveDate, i64)> = Entity::find()
            .select_only()
            .column(Column::PrescriptionDate)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::PrescriptionDate)
            .order_by_asc(Column::PrescriptionDate)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(date, count)| DailyCount {
                date,
                count: u64::try_from(count).unwrap_or_default(),
            })
            .collect())
    }
}
