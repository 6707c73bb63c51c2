use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use fundledger_core::settings::SettingsRepositoryTrait;
use fundledger_core::Result;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::app_settings;

/// Repository for the key/value settings store.
pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let value = app_settings::table
            .select(app_settings::setting_value)
            .find(key)
            .first::<String>(&mut conn)
            .optional()
            .into_core()?;
        Ok(value)
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let row = AppSettingDB {
            setting_key: key.to_string(),
            setting_value: value.to_string(),
        };
        self.writer
            .exec(move |conn| {
                diesel::insert_into(app_settings::table)
                    .values(&row)
                    .on_conflict(app_settings::setting_key)
                    .do_update()
                    .set(app_settings::setting_value.eq(&row.setting_value))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}
