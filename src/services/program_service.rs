use uuid::Uuid;

use crate::dto::admin_dto::{ImportOutcome, ProgramSiswaImportRow, RowError};
use crate::error::{Error, Result};
use crate::models::program::{Program, ProgramSiswa};
use crate::store::{
    modify_collection, read_collection, MutateOutcome, SharedStore, PROGRAMS_KEY,
    PROGRAM_SISWA_KEY,
};

/// Record stores for the program catalog and the per-student cohort
/// assignments.
#[derive(Clone)]
pub struct ProgramService {
    store: SharedStore,
}

impl ProgramService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // ---- Master program catalog ----

    pub async fn get_all_programs(&self) -> Result<Vec<Program>> {
        let (programs, _) =
            read_collection::<Vec<Program>>(self.store.as_ref(), PROGRAMS_KEY).await?;
        Ok(programs)
    }

    /// Insert a new program. Names are upper-cased and must be unique.
    pub async fn add_program(&self, nama_program: &str) -> Result<Program> {
        let program = Program {
            id: Uuid::new_v4(),
            nama_program: nama_program.to_uppercase(),
        };
        modify_collection::<Vec<Program>, _, _>(self.store.as_ref(), PROGRAMS_KEY, |programs| {
            if programs
                .iter()
                .any(|p| p.nama_program == program.nama_program)
            {
                return Err(Error::BadRequest("Program sudah ada".to_string()));
            }
            programs.push(program.clone());
            Ok(MutateOutcome::Commit(program.clone()))
        })
        .await
    }

    pub async fn delete_program(&self, id: Uuid) -> Result<bool> {
        modify_collection::<Vec<Program>, _, _>(self.store.as_ref(), PROGRAMS_KEY, |programs| {
            let before = programs.len();
            programs.retain(|p| p.id != id);
            if programs.len() == before {
                Ok(MutateOutcome::Unchanged(false))
            } else {
                Ok(MutateOutcome::Commit(true))
            }
        })
        .await
    }

    // ---- Program siswa (cohort assignments) ----

    pub async fn get_all_program_siswa(&self) -> Result<Vec<ProgramSiswa>> {
        let (all, _) =
            read_collection::<Vec<ProgramSiswa>>(self.store.as_ref(), PROGRAM_SISWA_KEY).await?;
        Ok(all)
    }

    pub async fn get_program_siswa_by_login(&self, login: &str) -> Result<Option<ProgramSiswa>> {
        let all = self.get_all_program_siswa().await?;
        let upper = login.to_uppercase();
        Ok(all.into_iter().find(|p| p.login == upper))
    }

    /// Upsert by login; last write wins.
    pub async fn save_program_siswa(
        &self,
        login: &str,
        nama_program: &str,
        batch: &str,
    ) -> Result<()> {
        let entry = ProgramSiswa {
            login: login.to_uppercase(),
            nama_program: nama_program.to_string(),
            batch: batch.to_string(),
        };
        modify_collection::<Vec<ProgramSiswa>, _, _>(
            self.store.as_ref(),
            PROGRAM_SISWA_KEY,
            |all| {
                match all.iter_mut().find(|p| p.login == entry.login) {
                    Some(existing) => *existing = entry.clone(),
                    None => all.push(entry.clone()),
                }
                Ok(MutateOutcome::Commit(()))
            },
        )
        .await
    }

    /// Partial update addressed by the current login. `new_login` renames
    /// the assignment.
    pub async fn update_program_siswa(
        &self,
        login: &str,
        new_login: Option<&str>,
        nama_program: Option<&str>,
        batch: Option<&str>,
    ) -> Result<()> {
        let upper = login.to_uppercase();
        modify_collection::<Vec<ProgramSiswa>, _, _>(
            self.store.as_ref(),
            PROGRAM_SISWA_KEY,
            |all| {
                let Some(entry) = all.iter_mut().find(|p| p.login == upper) else {
                    return Err(Error::NotFound("Siswa not found".to_string()));
                };
                if let Some(new_login) = new_login {
                    entry.login = new_login.to_uppercase();
                }
                if let Some(nama_program) = nama_program {
                    entry.nama_program = nama_program.to_string();
                }
                if let Some(batch) = batch {
                    entry.batch = batch.to_string();
                }
                Ok(MutateOutcome::Commit(()))
            },
        )
        .await
    }

    pub async fn delete_program_siswa(&self, login: &str) -> Result<bool> {
        let upper = login.to_uppercase();
        modify_collection::<Vec<ProgramSiswa>, _, _>(
            self.store.as_ref(),
            PROGRAM_SISWA_KEY,
            |all| {
                let before = all.len();
                all.retain(|p| p.login != upper);
                if all.len() == before {
                    Ok(MutateOutcome::Unchanged(false))
                } else {
                    Ok(MutateOutcome::Commit(true))
                }
            },
        )
        .await
    }

    /// Bulk import of cohort rows. Rows missing a login or program name are
    /// collected as row errors; the batch never aborts. Row numbering starts
    /// at 2, matching the spreadsheet the rows came from (row 1 is the
    /// header).
    pub async fn bulk_import_program_siswa(
        &self,
        rows: &[ProgramSiswaImportRow],
    ) -> Result<ImportOutcome> {
        let mut errors: Vec<RowError> = Vec::new();
        let mut valid: Vec<ProgramSiswa> = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let row_num = i + 2;
            let login = row.login.as_deref().unwrap_or("").trim().to_string();
            let nama_program = row.nama_program.as_deref().unwrap_or("").trim().to_string();
            if login.is_empty() || nama_program.is_empty() {
                errors.push(RowError {
                    row: row_num,
                    error: "Login atau NamaProgram kosong".to_string(),
                });
                continue;
            }
            valid.push(ProgramSiswa {
                login: login.to_uppercase(),
                nama_program,
                batch: row.batch.clone().unwrap_or_default(),
            });
        }

        let imported = valid.len();
        if imported > 0 {
            modify_collection::<Vec<ProgramSiswa>, _, _>(
                self.store.as_ref(),
                PROGRAM_SISWA_KEY,
                |all| {
                    for entry in &valid {
                        match all.iter_mut().find(|p| p.login == entry.login) {
                            Some(existing) => *existing = entry.clone(),
                            None => all.push(entry.clone()),
                        }
                    }
                    Ok(MutateOutcome::Commit(()))
                },
            )
            .await?;
        }

        Ok(ImportOutcome {
            success: errors.is_empty(),
            imported,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCollectionStore;
    use std::sync::Arc;

    fn service() -> ProgramService {
        ProgramService::new(Arc::new(MemoryCollectionStore::new()))
    }

    #[tokio::test]
    async fn program_names_are_unique_and_uppercased() {
        let svc = service();
        let created = svc.add_program("odp batch timur").await.unwrap();
        assert_eq!(created.nama_program, "ODP BATCH TIMUR");

        let err = svc.add_program("ODP Batch Timur").await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(svc.get_all_programs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn program_siswa_upsert_is_last_write_wins() {
        let svc = service();
        svc.save_program_siswa("a@x.com", "ODP", "1").await.unwrap();
        svc.save_program_siswa("A@X.COM", "MDP", "2").await.unwrap();

        let all = svc.get_all_program_siswa().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].nama_program, "MDP");
        assert_eq!(all[0].batch, "2");
    }

    #[tokio::test]
    async fn lookup_normalizes_login_case() {
        let svc = service();
        svc.save_program_siswa("A@X.COM", "ODP", "1").await.unwrap();
        let found = svc.get_program_siswa_by_login("a@x.com").await.unwrap();
        assert_eq!(found.unwrap().nama_program, "ODP");
    }

    #[tokio::test]
    async fn bulk_import_collects_row_errors_without_aborting() {
        let svc = service();
        let rows = vec![
            ProgramSiswaImportRow {
                login: Some("a@x.com".into()),
                nama_program: Some("ODP".into()),
                batch: Some("1".into()),
            },
            ProgramSiswaImportRow {
                login: None,
                nama_program: Some("ODP".into()),
                batch: None,
            },
            ProgramSiswaImportRow {
                login: Some("c@x.com".into()),
                nama_program: Some("MDP".into()),
                batch: None,
            },
        ];

        let outcome = svc.bulk_import_program_siswa(&rows).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 3);

        let all = svc.get_all_program_siswa().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|p| p.login == "A@X.COM"));
        assert!(all.iter().any(|p| p.login == "C@X.COM"));
    }

    #[tokio::test]
    async fn update_can_rename_login() {
        let svc = service();
        svc.save_program_siswa("a@x.com", "ODP", "1").await.unwrap();
        svc.update_program_siswa("a@x.com", Some("b@x.com"), None, Some("3"))
            .await
            .unwrap();

        let all = svc.get_all_program_siswa().await.unwrap();
        assert_eq!(all[0].login, "B@X.COM");
        assert_eq!(all[0].nama_program, "ODP");
        assert_eq!(all[0].batch, "3");

        let err = svc
            .update_program_siswa("a@x.com", None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
