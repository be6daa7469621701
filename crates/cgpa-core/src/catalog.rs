//! Subject catalog: parsing, validation and the JSON file store.
//!
//! The catalog maps each semester to its ordered subject list. On disk it is
//! a JSON object keyed `sem1`..`sem5`. Edits are validated before anything is
//! written, so a rejected edit leaves the previous catalog in effect.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::CatalogError;
use crate::model::{Semester, Subject};

/// Semester → ordered subjects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    semesters: BTreeMap<Semester, Vec<Subject>>,
}

#[derive(Debug, Deserialize)]
struct RawSubject {
    code: String,
    name: String,
    credits: f64,
}

impl Catalog {
    /// Parse and check catalog JSON.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<RawSubject>> = serde_json::from_str(content)?;
        let mut semesters = BTreeMap::new();

        for (key, subjects) in raw {
            let semester = Semester::from_key(&key)
                .ok_or_else(|| CatalogError::UnknownSemesterKey(key.clone()))?;

            let mut seen = HashSet::new();
            let mut parsed = Vec::with_capacity(subjects.len());
            for s in subjects {
                let code = s.code.trim().to_string();
                if code.is_empty() {
                    return Err(CatalogError::EmptyCode {
                        semester: key.clone(),
                        name: s.name,
                    });
                }
                if !s.credits.is_finite() || s.credits < 0.0 {
                    return Err(CatalogError::InvalidCredits {
                        semester: key.clone(),
                        code,
                        credits: s.credits,
                    });
                }
                if !seen.insert(code.clone()) {
                    return Err(CatalogError::DuplicateCode {
                        semester: key.clone(),
                        code,
                    });
                }
                parsed.push(Subject {
                    code,
                    name: s.name,
                    credits: s.credits,
                });
            }
            semesters.insert(semester, parsed);
        }

        Ok(Self { semesters })
    }

    /// Serialize back to the on-disk JSON shape.
    pub fn to_json_pretty(&self) -> Result<String> {
        let keyed: BTreeMap<String, &Vec<Subject>> = self
            .semesters
            .iter()
            .map(|(s, subjects)| (s.key(), subjects))
            .collect();
        serde_json::to_string_pretty(&keyed).context("failed to serialize catalog")
    }

    /// Subjects of a semester; empty if the semester has none defined.
    pub fn subjects(&self, semester: Semester) -> &[Subject] {
        self.semesters
            .get(&semester)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn subject(&self, semester: Semester, code: &str) -> Option<&Subject> {
        self.subjects(semester).iter().find(|s| s.code == code)
    }

    /// First semester (in order) that lists `code`.
    pub fn find_subject(&self, code: &str) -> Option<(Semester, &Subject)> {
        self.semesters
            .iter()
            .find_map(|(s, subjects)| subjects.iter().find(|x| x.code == code).map(|x| (*s, x)))
    }

    pub fn subject_count(&self) -> usize {
        self.semesters.values().map(Vec::len).sum()
    }

    /// The built-in five-semester curriculum.
    pub fn default_curriculum() -> Self {
        let table: [&[(&str, &str, f64)]; 5] = [
            &[
                ("MA201", "Mathematics-I", 4.0),
                ("ME202", "EG", 3.0),
                ("EE201", "Basic Electrical Engineering", 4.0),
                ("EE202", "Basic Electrical Engineering Laboratory", 1.5),
                ("CS201", "Programming for Problem Solving", 3.0),
                ("CS202", "Programming Laboratory", 1.5),
            ],
            &[
                ("MA202", "Mathematics-II", 4.0),
                ("PH201", "Physics", 4.0),
                ("PH202", "Physics Laboratory", 1.5),
                ("CY201", "Chemistry", 4.0),
                ("CY202", "Chemistry Laboratory", 1.5),
                ("ME201", "Workshop and Manufacturing Practice", 1.5),
                ("HS201", "English for Communication", 3.0),
            ],
            &[
                ("SH201", "Biology for Engineers", 2.0),
                ("EC235", "EDDS", 3.0),
                ("CS203", "COA", 4.0),
                ("CS204", "Data Structures", 3.0),
                ("CS205", "OOPL", 3.0),
                ("EC236", "EDDS Laboratory", 1.5),
                ("CS206", "Data Structures Laboratory", 1.5),
                ("CS207", "OOPL Laboratory", 1.5),
            ],
            &[
                ("MA206", "Mathematics for Computing", 4.0),
                ("CS208", "Operating Systems", 3.0),
                ("CS209", "DAA", 3.0),
                ("CS210", "DBMS", 3.0),
                ("CS211", "Software Engineering", 4.0),
                ("CS212", "Operating Systems Laboratory", 1.5),
                ("CS213", "DAA Laboratory", 1.5),
                ("CS214", "DBMS Laboratory", 1.5),
            ],
            &[
                ("HS202", "IEM", 3.0),
                ("CS215", "Platform Technologies", 3.0),
                ("CS216", "Computer Networks", 3.0),
                ("CS217", "ATCD", 4.0),
                ("CS218", "Platform Technologies Laboratory", 1.5),
                ("CS219", "Computer Networks Laboratory", 1.5),
                ("CSY06/CSY03", "MAD/Python", 3.0),
                ("NILL", "Open Elective", 3.0),
            ],
        ];

        let semesters = Semester::all()
            .zip(table)
            .map(|(semester, rows)| {
                let subjects: Vec<Subject> = rows
                    .iter()
                    .map(|(code, name, credits)| Subject {
                        code: (*code).to_string(),
                        name: (*name).to_string(),
                        credits: *credits,
                    })
                    .collect();
                (semester, subjects)
            })
            .collect();

        Self { semesters }
    }
}

/// A non-fatal finding about a catalog.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub semester: Option<Semester>,
    pub message: String,
}

/// Check a catalog for suspicious but accepted content.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for semester in Semester::all() {
        if catalog.subjects(semester).is_empty() {
            warnings.push(ValidationWarning {
                semester: Some(semester),
                message: "no subjects defined".into(),
            });
        }
    }

    for semester in Semester::all() {
        for subject in catalog.subjects(semester) {
            if subject.credits == 0.0 {
                warnings.push(ValidationWarning {
                    semester: Some(semester),
                    message: format!("{} has zero credits", subject.code),
                });
            }
        }
    }

    // Arrears are keyed by code alone, so a code shared between semesters is ambiguous.
    let mut homes: HashMap<&str, Vec<Semester>> = HashMap::new();
    for semester in Semester::all() {
        for subject in catalog.subjects(semester) {
            homes.entry(subject.code.as_str()).or_default().push(semester);
        }
    }
    let mut shared: Vec<_> = homes.into_iter().filter(|(_, s)| s.len() > 1).collect();
    shared.sort_by(|a, b| a.0.cmp(b.0));
    for (code, semesters) in shared {
        let list: Vec<String> = semesters.iter().map(|s| s.key()).collect();
        warnings.push(ValidationWarning {
            semester: None,
            message: format!("{code} appears in {}", list.join(", ")),
        });
    }

    warnings
}

/// Durable storage for the catalog.
pub trait CatalogStore: Send + Sync {
    fn load(&self) -> Result<Catalog>;
    fn save(&self, catalog: &Catalog) -> Result<()>;
}

/// Catalog stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the default curriculum if no catalog file exists yet.
    ///
    /// Returns `true` if a file was created.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&Catalog::default_curriculum())?;
        tracing::info!("created default catalog at {}", self.path.display());
        Ok(true)
    }
}

impl CatalogStore for JsonFileCatalog {
    fn load(&self) -> Result<Catalog> {
        self.ensure_exists()?;
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read catalog: {}", self.path.display()))?;
        let catalog = Catalog::from_json_str(&content)
            .with_context(|| format!("failed to parse catalog: {}", self.path.display()))?;
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        let json = catalog.to_json_pretty()?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;

        // Write beside the target and rename so readers never see a partial file.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .with_context(|| format!("failed to write temp file in {}", dir.display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to write catalog to {}", self.path.display()))?;
        Ok(())
    }
}

/// Read-mostly catalog handle shared between sessions.
///
/// Sessions take an immutable snapshot; commits swap the catalog under the
/// write lock and only affect snapshots taken afterwards.
#[derive(Debug, Default)]
pub struct SharedCatalog {
    current: RwLock<Arc<Catalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The catalog as of now.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist `catalog` and make it current.
    pub fn commit(&self, store: &dyn CatalogStore, catalog: Catalog) -> Result<()> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        store.save(&catalog)?;
        tracing::info!(subjects = catalog.subject_count(), "catalog committed");
        *guard = Arc::new(catalog);
        Ok(())
    }

    /// Parse `content` and commit it.
    ///
    /// Malformed input is rejected with the parse error; the current catalog
    /// and the stored file stay as they were.
    pub fn replace_from_str(&self, store: &dyn CatalogStore, content: &str) -> Result<Arc<Catalog>> {
        let catalog = Catalog::from_json_str(content).context("catalog edit rejected")?;
        self.commit(store, catalog)?;
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sem(n: u32) -> Semester {
        Semester::try_from(n).unwrap()
    }

    const SMALL: &str = r#"{
        "sem1": [
            {"code": "MA201", "name": "Mathematics-I", "credits": 4},
            {"code": "ME202", "name": "EG", "credits": 3.0}
        ],
        "sem3": [
            {"code": "CS204", "name": "Data Structures", "credits": 3.0}
        ]
    }"#;

    #[test]
    fn parse_small_catalog() {
        let catalog = Catalog::from_json_str(SMALL).unwrap();
        assert_eq!(catalog.subjects(sem(1)).len(), 2);
        assert_eq!(catalog.subjects(sem(1))[0].code, "MA201");
        assert_eq!(catalog.subjects(sem(1))[0].credits, 4.0);
        assert!(catalog.subjects(sem(2)).is_empty());
        assert_eq!(catalog.subject(sem(3), "CS204").map(|s| s.credits), Some(3.0));
        assert_eq!(catalog.subject_count(), 3);
        assert_eq!(catalog.find_subject("CS204").map(|(s, _)| s), Some(sem(3)));
        assert!(catalog.find_subject("XX000").is_none());
    }

    #[test]
    fn reject_malformed_json() {
        let err = Catalog::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn reject_unknown_semester_key() {
        let err = Catalog::from_json_str(r#"{"sem6": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownSemesterKey(k) if k == "sem6"));
    }

    #[test]
    fn reject_aliased_semester_key() {
        let json = r#"{
            "sem01": [{"code": "X1", "name": "x", "credits": 3}],
            "sem1": [{"code": "Y1", "name": "y", "credits": 3}]
        }"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownSemesterKey(k) if k == "sem01"));

        let err = Catalog::from_json_str(r#"{"sem+2": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownSemesterKey(k) if k == "sem+2"));
    }

    #[test]
    fn reject_duplicate_codes_within_semester() {
        let json = r#"{"sem1": [
            {"code": "MA201", "name": "a", "credits": 4},
            {"code": "MA201", "name": "b", "credits": 3}
        ]}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCode { .. }));
    }

    #[test]
    fn reject_negative_credits() {
        let json = r#"{"sem1": [{"code": "MA201", "name": "a", "credits": -1}]}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCredits { .. }));
    }

    #[test]
    fn reject_empty_code() {
        let json = r#"{"sem1": [{"code": "  ", "name": "blank", "credits": 1}]}"#;
        assert!(matches!(
            Catalog::from_json_str(json).unwrap_err(),
            CatalogError::EmptyCode { .. }
        ));
    }

    #[test]
    fn default_curriculum_shape() {
        let catalog = Catalog::default_curriculum();
        let counts: Vec<usize> = Semester::all().map(|s| catalog.subjects(s).len()).collect();
        assert_eq!(counts, vec![6, 7, 8, 8, 8]);
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let catalog = Catalog::default_curriculum();
        let json = catalog.to_json_pretty().unwrap();
        assert!(json.contains("\"sem1\""));
        assert_eq!(Catalog::from_json_str(&json).unwrap(), catalog);
    }

    #[test]
    fn validation_warnings() {
        let json = r#"{
            "sem1": [{"code": "X1", "name": "x", "credits": 0}],
            "sem2": [{"code": "X1", "name": "x again", "credits": 2}]
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        let warnings = validate_catalog(&catalog);
        assert!(warnings.iter().any(|w| w.message.contains("zero credits")));
        assert!(warnings.iter().any(|w| w.message == "X1 appears in sem1, sem2"));
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.message == "no subjects defined")
                .count(),
            3
        );
    }

    #[test]
    fn file_store_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCatalog::new(dir.path().join("subjects.json"));
        assert!(!store.path().exists());

        let catalog = store.load().unwrap();
        assert!(store.path().exists());
        assert_eq!(catalog, Catalog::default_curriculum());
        assert!(!store.ensure_exists().unwrap());
    }

    #[test]
    fn file_store_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCatalog::new(dir.path().join("nested/subjects.json"));
        let catalog = Catalog::from_json_str(SMALL).unwrap();
        store.save(&catalog).unwrap();
        assert_eq!(store.load().unwrap(), catalog);
    }

    #[test]
    fn rejected_edit_keeps_previous_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCatalog::new(dir.path().join("subjects.json"));
        let shared = SharedCatalog::new(store.load().unwrap());
        let before_file = std::fs::read_to_string(store.path()).unwrap();

        let err = shared
            .replace_from_str(&store, r#"{"sem1": [{"code": "A"}]}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("catalog edit rejected"));
        assert_eq!(*shared.snapshot(), Catalog::default_curriculum());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before_file);
    }

    #[test]
    fn commit_is_visible_to_new_snapshots_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCatalog::new(dir.path().join("subjects.json"));
        let shared = SharedCatalog::new(store.load().unwrap());

        let old = shared.snapshot();
        let new = shared.replace_from_str(&store, SMALL).unwrap();

        assert_eq!(old.subjects(sem(1)).len(), 6);
        assert_eq!(new.subjects(sem(1)).len(), 2);
        assert_eq!(shared.snapshot().subject_count(), 3);
        assert_eq!(store.load().unwrap(), *new);
    }
}
