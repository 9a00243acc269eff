use crate::dto::admin_dto::{ImportOutcome, MitraImportRow, RowError, SaveMitraPayload};
use crate::error::Result;
use crate::models::mitra::{mitra_company, Mitra};
use crate::store::{modify_collection, read_collection, MutateOutcome, SharedStore, MITRA_KEY};

/// Record store for partner (mitra kerja) records.
#[derive(Clone)]
pub struct MitraService {
    store: SharedStore,
}

impl MitraService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<Mitra>> {
        let (all, _) = read_collection::<Vec<Mitra>>(self.store.as_ref(), MITRA_KEY).await?;
        Ok(all)
    }

    pub async fn get(&self, login: &str) -> Result<Option<Mitra>> {
        let all = self.get_all().await?;
        let upper = login.to_uppercase();
        Ok(all.into_iter().find(|m| m.login == upper))
    }

    pub async fn save(&self, payload: &SaveMitraPayload) -> Result<()> {
        let entry = mitra_from(payload);
        modify_collection::<Vec<Mitra>, _, _>(self.store.as_ref(), MITRA_KEY, |all| {
            match all.iter_mut().find(|m| m.login == entry.login) {
                Some(existing) => *existing = entry.clone(),
                None => all.push(entry.clone()),
            }
            Ok(MutateOutcome::Commit(()))
        })
        .await
    }

    pub async fn delete(&self, login: &str) -> Result<bool> {
        let upper = login.to_uppercase();
        modify_collection::<Vec<Mitra>, _, _>(self.store.as_ref(), MITRA_KEY, |all| {
            let before = all.len();
            all.retain(|m| m.login != upper);
            if all.len() == before {
                Ok(MutateOutcome::Unchanged(false))
            } else {
                Ok(MutateOutcome::Commit(true))
            }
        })
        .await
    }

    /// Bulk import, partial-failure model: rows without a login are
    /// reported per row (numbering starts at 2 for the spreadsheet header),
    /// the rest are upserted in one collection write.
    pub async fn bulk_import(&self, rows: &[MitraImportRow]) -> Result<ImportOutcome> {
        let mut errors: Vec<RowError> = Vec::new();
        let mut valid: Vec<Mitra> = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let login = row.login.as_deref().unwrap_or("").trim().to_string();
            if login.is_empty() {
                errors.push(RowError {
                    row: i + 2,
                    error: "Login kosong".to_string(),
                });
                continue;
            }
            valid.push(Mitra {
                login: login.to_uppercase(),
                nama: row.nama.clone().unwrap_or_default(),
                cabang: row.cabang.clone().unwrap_or_default(),
                divisi: row.divisi.clone().unwrap_or_default(),
                departemen: row.departemen.clone().unwrap_or_default(),
                nama_atasan: row.nama_atasan.clone().unwrap_or_default(),
                company: mitra_company(),
            });
        }

        let imported = valid.len();
        if imported > 0 {
            modify_collection::<Vec<Mitra>, _, _>(self.store.as_ref(), MITRA_KEY, |all| {
                for entry in &valid {
                    match all.iter_mut().find(|m| m.login == entry.login) {
                        Some(existing) => *existing = entry.clone(),
                        None => all.push(entry.clone()),
                    }
                }
                Ok(MutateOutcome::Commit(()))
            })
            .await?;
        }

        Ok(ImportOutcome {
            success: errors.is_empty(),
            imported,
            errors,
        })
    }
}

fn mitra_from(payload: &SaveMitraPayload) -> Mitra {
    Mitra {
        login: payload.login.to_uppercase(),
        nama: payload.nama.clone().unwrap_or_default(),
        cabang: payload.cabang.clone().unwrap_or_default(),
        divisi: payload.divisi.clone().unwrap_or_default(),
        departemen: payload.departemen.clone().unwrap_or_default(),
        nama_atasan: payload.nama_atasan.clone().unwrap_or_default(),
        company: mitra_company(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCollectionStore;
    use std::sync::Arc;

    fn service() -> MitraService {
        MitraService::new(Arc::new(MemoryCollectionStore::new()))
    }

    fn payload(login: &str, nama: &str) -> SaveMitraPayload {
        SaveMitraPayload {
            login: login.to_string(),
            nama: Some(nama.to_string()),
            cabang: None,
            divisi: None,
            departemen: None,
            nama_atasan: None,
        }
    }

    #[tokio::test]
    async fn save_upserts_by_login() {
        let svc = service();
        svc.save(&payload("m@x.com", "Mitra One")).await.unwrap();
        svc.save(&payload("M@X.COM", "Mitra Renamed")).await.unwrap();

        let all = svc.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].nama, "Mitra Renamed");
        assert_eq!(all[0].company, "MITRA");
    }

    #[tokio::test]
    async fn bulk_import_reports_missing_logins() {
        let svc = service();
        let rows = vec![
            MitraImportRow {
                login: Some("m1@x.com".into()),
                nama: Some("One".into()),
                cabang: None,
                divisi: None,
                departemen: None,
                nama_atasan: None,
            },
            MitraImportRow {
                login: None,
                nama: Some("Two".into()),
                cabang: None,
                divisi: None,
                departemen: None,
                nama_atasan: None,
            },
        ];

        let outcome = svc.bulk_import(&rows).await.unwrap();
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 3);
        assert_eq!(svc.get_all().await.unwrap().len(), 1);
    }
}
