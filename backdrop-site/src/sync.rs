//! Merge a LinkedIn "Download your data" export into the certifications file.
//!
//! LinkedIn offers no live API for profile data, so the export CSV is the
//! source of truth for names, issuers, dates and credential ids, while the
//! site's JSON keeps the hand-curated skills and categories.

use crate::certs::{Category, Certification};
use crate::error::SyncError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Longest generated id, in bytes.
pub const MAX_ID_LEN: usize = 80;

/// One row of the LinkedIn export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkedInCert {
    pub name: String,
    pub issuer: String,
    pub issued_date: String,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Rows read from the export.
    pub found: usize,
    pub added: usize,
    /// Existing records that gained at least one field.
    pub updated: usize,
    pub total: usize,
    pub written: bool,
}

/// Resolve the CSV to read: `input` itself, or the first file in the
/// directory whose lowercase name contains `certification`.
pub fn locate_export(input: &Path) -> Result<PathBuf, SyncError> {
    if input.is_file() {
        return Ok(input.to_path_buf());
    }
    if !input.is_dir() {
        return Err(SyncError::NotFound(input.to_path_buf()));
    }

    let mut names: Vec<_> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
        .into_iter()
        .find(|n| n.to_lowercase().contains("certification"))
        .map(|n| input.join(n))
        .ok_or_else(|| SyncError::NoCertificationFile(input.to_path_buf()))
}

/// First header containing any of `needles`, tried in order.
fn column(headers: &[String], needles: &[&str]) -> Option<usize> {
    needles
        .iter()
        .find_map(|needle| headers.iter().position(|h| h.contains(needle)))
}

/// Read the export CSV. Columns are located by fuzzy header match; rows with
/// neither a name nor an issuer are skipped.
pub fn read_linkedin_csv(path: &Path) -> Result<Vec<LinkedInCert>, SyncError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_lowercase()).collect();
    let name_col = column(&headers, &["name", "certification"]).or(Some(0));
    let issuer_col = column(&headers, &["authority", "issuer", "organization"])
        .or((headers.len() > 1).then_some(1));
    let number_col = column(&headers, &["number", "license", "credential"]);
    let start_col = column(&headers, &["start", "date"]);
    let end_col = column(&headers, &["end", "finish"]);
    let url_col = column(&headers, &["url"]);
    debug!(?headers, "export columns");

    let mut certs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };
        let optional = |col: Option<usize>| Some(field(col)).filter(|s| !s.is_empty());

        let name = field(name_col);
        let issuer = field(issuer_col);
        if name.is_empty() && issuer.is_empty() {
            continue;
        }
        let date = optional(end_col).or_else(|| optional(start_col)).unwrap_or_default();
        certs.push(LinkedInCert {
            name,
            issuer,
            issued_date: normalize_date(&date),
            credential_id: optional(number_col),
            credential_url: optional(url_col),
        });
    }
    Ok(certs)
}

fn month_name(month: &str) -> Option<&'static str> {
    let m: usize = month.parse().ok()?;
    MONTHS.get(m.checked_sub(1)?).copied()
}

/// `2025-01` and `1/2025` anywhere in the string become `Jan 2025`; anything
/// else is returned trimmed.
pub fn normalize_date(value: &str) -> String {
    let s = value.trim();
    let b = s.as_bytes();
    let digit = |i: usize| b.get(i).is_some_and(u8::is_ascii_digit);

    // YYYY-M(M)
    for i in 0..b.len() {
        if (i..i + 4).all(digit) && b.get(i + 4) == Some(&b'-') && digit(i + 5) {
            let end = if digit(i + 6) { i + 7 } else { i + 6 };
            if let Some(month) = month_name(&s[i + 5..end]) {
                return format!("{} {}", month, &s[i..i + 4]);
            }
        }
    }

    // M(M)/YYYY
    for j in 0..b.len() {
        if b[j] == b'/' && j > 0 && digit(j - 1) && (j + 1..j + 5).all(digit) {
            let start = if j >= 2 && digit(j - 2) { j - 2 } else { j - 1 };
            if let Some(month) = month_name(&s[start..j]) {
                return format!("{} {}", month, &s[j + 1..j + 5]);
            }
        }
    }

    s.to_string()
}

/// Parse `Mon YYYY` or `Month YYYY` to the first of that month.
pub fn parse_issued(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {}", value.trim()), "%d %b %Y").ok()
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// `slug(issuer)-slug(name)`, cut to [`MAX_ID_LEN`].
pub fn make_id(name: &str, issuer: &str) -> String {
    let mut id = format!("{}-{}", slugify(issuer), slugify(name));
    id.truncate(MAX_ID_LEN);
    id
}

/// Newest first; records with unparseable dates go last in their original order.
pub fn sort_newest_first(certs: &mut [Certification]) {
    certs.sort_by_key(|c| std::cmp::Reverse(parse_issued(&c.issued_date)));
}

/// Merge export rows into existing records.
///
/// Records match on lowercase `(name, issuer)`. Existing records keep
/// everything they have and only gain fields they lack. New records get a
/// generated id, the professional category and no skills.
pub fn merge(linkedin: Vec<LinkedInCert>, existing: Vec<Certification>) -> Vec<Certification> {
    merge_counted(linkedin, existing).0
}

fn merge_counted(
    linkedin: Vec<LinkedInCert>,
    existing: Vec<Certification>,
) -> (Vec<Certification>, usize, usize) {
    let mut merged = existing;
    let mut index: HashMap<(String, String), usize> = merged
        .iter()
        .enumerate()
        .map(|(i, c)| (c.merge_key(), i))
        .collect();
    let (mut added, mut updated) = (0, 0);

    for row in linkedin {
        let key = (row.name.to_lowercase(), row.issuer.to_lowercase());
        match index.get(&key) {
            Some(&i) => {
                let cert = &mut merged[i];
                let mut changed = false;
                if cert.issued_date.is_empty() && !row.issued_date.is_empty() {
                    cert.issued_date = row.issued_date;
                    changed = true;
                }
                if cert.credential_id.is_none() && row.credential_id.is_some() {
                    cert.credential_id = row.credential_id;
                    changed = true;
                }
                if cert.credential_url.is_none() && row.credential_url.is_some() {
                    cert.credential_url = row.credential_url;
                    changed = true;
                }
                if changed {
                    updated += 1;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(Certification {
                    id: make_id(&row.name, &row.issuer),
                    name: row.name,
                    issuer: row.issuer,
                    issued_date: row.issued_date,
                    credential_id: row.credential_id,
                    credential_url: row.credential_url,
                    skills: Vec::new(),
                    category: Category::Professional,
                });
                added += 1;
            }
        }
    }

    sort_newest_first(&mut merged);
    (merged, added, updated)
}

/// Existing records at `path`. A missing or blank file counts as none; any
/// other read or parse failure is an error so curated data is never dropped.
fn load_existing(path: &Path) -> Result<Vec<Certification>, SyncError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no existing certifications");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&json).map_err(|e| SyncError::InvalidExisting(path.to_path_buf(), e))
}

/// Read the export at `input`, merge into `output` and write it back unless
/// `dry_run` is set.
pub fn run(input: &Path, output: &Path, dry_run: bool) -> Result<SyncReport, SyncError> {
    let source = locate_export(input)?;
    let linkedin = read_linkedin_csv(&source)?;
    let found = linkedin.len();
    info!(source = %source.display(), found, "read LinkedIn export");

    let (merged, added, updated) = merge_counted(linkedin, load_existing(output)?);
    let total = merged.len();

    if !dry_run {
        if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(output, serde_json::to_string_pretty(&merged)?)?;
        info!(output = %output.display(), total, "certifications written");
    }

    Ok(SyncReport {
        source,
        output: output.to_path_buf(),
        found,
        added,
        updated,
        total,
        written: !dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, issuer: &str, date: &str) -> LinkedInCert {
        LinkedInCert {
            name: name.into(),
            issuer: issuer.into(),
            issued_date: date.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2025-01"), "Jan 2025");
        assert_eq!(normalize_date("2024-11-30"), "Nov 2024");
        assert_eq!(normalize_date("3/2023"), "Mar 2023");
        assert_eq!(normalize_date("12/2022"), "Dec 2022");
        assert_eq!(normalize_date("  January 2025 "), "January 2025");
        assert_eq!(normalize_date("2025-13"), "2025-13");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_parse_issued() {
        assert_eq!(parse_issued("Jan 2025"), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(parse_issued("September 2023"), NaiveDate::from_ymd_opt(2023, 9, 1));
        assert_eq!(parse_issued("soon"), None);
    }

    #[test]
    fn test_make_id() {
        assert_eq!(
            make_id("OCI Generative AI Professional", "Oracle"),
            "oracle-oci-generative-ai-professional"
        );
        assert_eq!(make_id("  C++ & Rust!  ", "Über Org"), "ber-org-c-rust");
        assert_eq!(make_id(&"x".repeat(200), "a").len(), MAX_ID_LEN);
    }

    #[test]
    fn test_merge_keeps_curated_fields() {
        let mut existing = crate::certs::default_certifications();
        existing[0].credential_url = Some("https://example.com/verify".into());
        existing[1].issued_date.clear();
        let skills = existing[0].skills.clone();

        let mut update = row("oci generative ai professional", "ORACLE", "Jan 2020");
        update.credential_id = Some("ABC".into());
        update.credential_url = Some("https://linkedin.example/other".into());
        let second = row("Oracle Cloud Infrastructure Foundations Associate", "Oracle", "Mar 2024");

        let (merged, added, updated) = merge_counted(vec![update, second], existing);
        assert_eq!(added, 0);
        assert_eq!(updated, 2);

        let gen_ai = merged.iter().find(|c| c.id == "oracle-oci-generative-ai-professional").unwrap();
        assert_eq!(gen_ai.issued_date, "Sep 2024");
        assert_eq!(gen_ai.credential_id.as_deref(), Some("ABC"));
        assert_eq!(gen_ai.credential_url.as_deref(), Some("https://example.com/verify"));
        assert_eq!(gen_ai.skills, skills);

        let foundations = merged.iter().find(|c| c.id == "oracle-oci-foundations-associate").unwrap();
        assert_eq!(foundations.issued_date, "Mar 2024");
    }

    #[test]
    fn test_merge_adds_new_and_sorts() {
        let merged = merge(
            vec![
                row("Old", "Acme", "Feb 2019"),
                row("Undated", "Acme", ""),
                row("New", "Acme", "Dec 2025"),
            ],
            Vec::new(),
        );
        let names: Vec<_> = merged.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["New", "Old", "Undated"]);
        assert_eq!(merged[0].id, "acme-new");
        assert_eq!(merged[0].category, Category::Professional);
        assert!(merged[0].skills.is_empty());
    }

    #[test]
    fn test_duplicate_rows_merge_once() {
        let merged = merge(
            vec![row("Same", "Org", "Jan 2024"), row("SAME", "org", "Feb 2024")],
            Vec::new(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].issued_date, "Jan 2024");
    }
}
