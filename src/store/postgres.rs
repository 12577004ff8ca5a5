use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};

use super::{SlotStore, StoreError};
use crate::entity::slots::{ActiveModel, Column, Entity as Slots};

/// Slots kept as rows of a key/value table.
#[derive(Debug, Clone)]
pub struct PgSlotStore {
    conn: DatabaseConnection,
}

impl PgSlotStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SlotStore for PgSlotStore {
    async fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let row = Slots::find_by_id(slot.to_owned()).one(&self.conn).await?;
        Ok(row.map(|row| row.value))
    }

    async fn write(&self, slot: &str, blob: String) -> Result<(), StoreError> {
        let row = ActiveModel {
            key: Set(slot.to_owned()),
            value: Set(blob),
            updated_at: Set(Utc::now().into()),
        };

        Slots::insert(row)
            .on_conflict(
                OnConflict::column(Column::Key)
                    .update_columns([Column::Value, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }
}
