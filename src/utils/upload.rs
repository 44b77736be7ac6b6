use actix_multipart::{Field, Multipart};
use futures::StreamExt;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::utils::error::AppError;
use crate::utils::time::now_millis;

/// Text parts of a multipart form are small; anything bigger is a client bug.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

lazy_static! {
    static ref REPEATED_WHITESPACE: Regex = Regex::new(r"\s\s+").expect("valid whitespace regex");
    static ref UNSAFE_NAME_CHARS: Regex =
        Regex::new(r#"[&/\\#, +()$~%'":=*?<>{}@-]"#).expect("valid file name regex");
}

/// How a stored file is named on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// `<millis>_<sanitized original name>`
    Timestamped,
    /// `<first 10 chars of stem><millis><.ext>`
    ShortStem,
}

/// Where an upload goes and what it may contain.
#[derive(Debug)]
pub struct UploadPolicy {
    pub field: &'static str,
    pub subdir: &'static str,
    pub max_bytes: usize,
    pub allowed_types: &'static [&'static str],
    pub type_error: &'static str,
    pub naming: Naming,
}

pub const PROFILE_PICTURE: UploadPolicy = UploadPolicy {
    field: "profile",
    subdir: "user",
    max_bytes: 20 * 1024 * 1024,
    allowed_types: &[
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/svg+xml",
        "image/gif",
        "image/webp",
        "image/avif",
    ],
    type_error: "Invalid file type",
    naming: Naming::Timestamped,
};

pub const DOCUMENT_RESUME: UploadPolicy = UploadPolicy {
    field: "resume",
    subdir: "resume",
    max_bytes: 5 * 1024 * 1024,
    allowed_types: &[
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ],
    type_error: "Invalid file type. Only PDF and Word files are allowed.",
    naming: Naming::ShortStem,
};

pub const VIDEO_RESUME: UploadPolicy = UploadPolicy {
    field: "video",
    subdir: "videos",
    max_bytes: 100 * 1024 * 1024,
    allowed_types: &[
        "video/mp4",
        "video/mpeg",
        "video/quicktime",
        "video/avi",
        "video/webm",
    ],
    type_error: "Invalid file type. Only video files are allowed.",
    naming: Naming::ShortStem,
};

impl UploadPolicy {
    pub fn accepts(&self, content_type: &str) -> bool {
        self.allowed_types.contains(&content_type)
    }

    pub fn stored_name(&self, original: &str, millis: i64) -> String {
        match self.naming {
            Naming::Timestamped => format!("{}_{}", millis, sanitize_file_name(original)),
            Naming::ShortStem => short_stem_name(original, millis),
        }
    }
}

/// A file written to disk from a multipart upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub original_name: String,
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub content_type: String,
}

impl StoredFile {
    /// Lower-cased extension of the client's file name, without the dot.
    pub fn extension(&self) -> String {
        file_extension(&self.original_name)
    }
}

/// Text fields plus at most one stored file.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<StoredFile>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn require_file(self) -> Result<StoredFile, AppError> {
        self.file
            .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))
    }
}

/// Collapses whitespace runs, then replaces every unsafe character with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let collapsed = REPEATED_WHITESPACE.replace_all(name, " ");
    UNSAFE_NAME_CHARS.replace_all(&collapsed, "_").into_owned()
}

pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            e.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .unwrap_or_default()
}

fn short_stem_name(original: &str, millis: i64) -> String {
    // only the last path segment of the client's name lands on disk
    let base = original.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let stem: String = base
        .split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .take(10)
        .collect();

    let ext = file_extension(original);
    if ext.is_empty() {
        format!("{}{}", stem, millis)
    } else {
        format!("{}{}.{}", stem, millis, ext)
    }
}

/// Reads a multipart payload, storing the policy's file field under
/// `<upload_root>/<policy.subdir>/` and keeping text fields in memory.
pub async fn read_upload_form(
    mut payload: Multipart,
    upload_root: &Path,
    policy: &UploadPolicy,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        match file_name {
            Some(original) if name == policy.field && form.file.is_none() => {
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_default();

                if !policy.accepts(&content_type) {
                    log::warn!("⚠️  Rejected upload '{}' ({})", original, content_type);
                    return Err(AppError::BadRequest(policy.type_error.to_string()));
                }

                let stored = store_field(&mut field, upload_root, policy, &original, content_type).await?;
                form.file = Some(stored);
            }
            Some(original) => {
                log::warn!("⚠️  Ignoring unexpected file field '{}' ({})", name, original);
                drain(&mut field).await?;
            }
            None => {
                let value = read_text(&mut field).await?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Reads a multipart payload that carries only text fields. File parts are
/// drained and dropped.
pub async fn read_text_form(mut payload: Multipart) -> Result<HashMap<String, String>, AppError> {
    let mut fields = HashMap::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
        let name = field.name().unwrap_or_default().to_string();

        if field.content_disposition().and_then(|cd| cd.get_filename()).is_some() {
            log::warn!("⚠️  Ignoring file field '{}' in a text-only form", name);
            drain(&mut field).await?;
            continue;
        }

        let value = read_text(&mut field).await?;
        fields.insert(name, value);
    }

    Ok(fields)
}

async fn store_field(
    field: &mut Field,
    upload_root: &Path,
    policy: &UploadPolicy,
    original: &str,
    content_type: String,
) -> Result<StoredFile, AppError> {
    let dir = upload_root.join(policy.subdir);
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = policy.stored_name(original, now_millis());
    let path = dir.join(&file_name);

    let mut file = tokio::fs::File::create(&path).await?;
    let mut size: usize = 0;

    let written: Result<(), AppError> = async {
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
            size += chunk.len();
            if size > policy.max_bytes {
                return Err(AppError::BadRequest("File size exceeds the limit".to_string()));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(rm) = tokio::fs::remove_file(&path).await {
            log::warn!("⚠️  Could not remove partial upload {}: {}", path.display(), rm);
        }
        return Err(e);
    }

    log::info!("📁 Stored upload {} ({} bytes)", path.display(), size);

    Ok(StoredFile {
        original_name: original.to_string(),
        file_name,
        path,
        size: size as u64,
        content_type,
    })
}

async fn read_text(field: &mut Field) -> Result<String, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::BadRequest("Form field too large".to_string()));
        }
        buf.extend_from_slice(&chunk);
    }

    String::from_utf8(buf).map_err(|_| AppError::BadRequest("Form fields must be UTF-8".to_string()))
}

async fn drain(field: &mut Field) -> Result<(), AppError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
    }
    Ok(())
}

/// True when `path` is a plain relative or absolute path below `root`
/// with no `..` segments.
pub fn is_inside(root: &Path, path: &Path) -> bool {
    path.starts_with(root) && !path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Removes a previously stored file. Failures are logged; the request carries on.
pub async fn remove_stored_file(root: &Path, path: &Path) {
    if !is_inside(root, path) {
        log::warn!("⚠️  Refusing to delete {} (outside {})", path.display(), root.display());
        return;
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => log::info!("🗑️  Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("File already gone: {}", path.display())
        }
        Err(e) => log::error!("❌ Error deleting file {}: {}", path.display(), e),
    }
}

/// Maps a stored profile URL (`<backend>/upload/user/<file>`) back to its path on disk.
pub fn profile_path_from_url(upload_root: &Path, url: &str) -> Option<PathBuf> {
    let base = url.rsplit('/').next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(upload_root.join(PROFILE_PICTURE.subdir).join(base))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my  photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name("a&b@c-d.jpg"), "a_b_c_d.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("plain.webp"), "plain.webp");
    }

    #[test]
    fn test_stored_names() {
        assert_eq!(
            PROFILE_PICTURE.stored_name("me at work.png", 1700000000000),
            "1700000000000_me_at_work.png"
        );
        assert_eq!(
            DOCUMENT_RESUME.stored_name("John Smith Resume.v2.PDF", 1700000000000),
            "John_Smith1700000000000.pdf"
        );
        assert_eq!(VIDEO_RESUME.stored_name("intro.mp4", 42), "intro42.mp4");
        assert_eq!(DOCUMENT_RESUME.stored_name("../secret.pdf", 7), "secret7.pdf");
        assert_eq!(DOCUMENT_RESUME.stored_name("C:\\cv\\my cv(1).docx", 7), "my_cv(1)7.docx");
        assert_eq!(DOCUMENT_RESUME.stored_name("noext", 7), "noext7");
    }

    #[test]
    fn test_policies() {
        assert!(DOCUMENT_RESUME.accepts("application/pdf"));
        assert!(!DOCUMENT_RESUME.accepts("image/png"));
        assert!(VIDEO_RESUME.accepts("video/webm"));
        assert!(!VIDEO_RESUME.accepts("application/pdf"));
        assert!(PROFILE_PICTURE.accepts("image/svg+xml"));
        assert!(!PROFILE_PICTURE.accepts("video/mp4"));
        assert_eq!(DOCUMENT_RESUME.max_bytes, 5 * 1024 * 1024);
        assert_eq!(VIDEO_RESUME.max_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("cv.DOCX"), "docx");
        assert_eq!(file_extension("clip.final.mp4"), "mp4");
        assert_eq!(file_extension("README"), "");
    }

    #[test]
    fn test_is_inside() {
        let root = Path::new("upload");
        assert!(is_inside(root, Path::new("upload/resume/a.pdf")));
        assert!(!is_inside(root, Path::new("upload/../Cargo.toml")));
        assert!(!is_inside(root, Path::new("/etc/passwd")));
    }

    #[test]
    fn test_profile_path_from_url() {
        let root = Path::new("upload");
        assert_eq!(
            profile_path_from_url(root, "http://localhost:5002/upload/user/1_me.png"),
            Some(PathBuf::from("upload/user/1_me.png"))
        );
        assert_eq!(profile_path_from_url(root, "http://localhost:5002/upload/user/"), None);
    }

    #[tokio::test]
    async fn test_remove_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let file = root.join("resume").join("old.pdf");
        tokio::fs::create_dir_all(file.parent().unwrap()).await.unwrap();
        tokio::fs::write(&file, b"%PDF").await.unwrap();

        remove_stored_file(root, &file).await;
        assert!(!file.exists());

        // already gone: no panic, nothing to do
        remove_stored_file(root, &file).await;
    }

    #[actix_web::test]
    async fn test_document_upload_is_stored_with_short_name() {
        let dir = tempfile::tempdir().unwrap();
        let payload = testing::payload(&[
            testing::text("title", "Backend CV"),
            testing::file("resume", "cv final.pdf", "application/pdf", b"%PDF-1.4".to_vec()),
        ]);

        let form = read_upload_form(payload, dir.path(), &DOCUMENT_RESUME).await.unwrap();
        assert_eq!(form.text("title").as_deref(), Some("Backend CV"));

        let stored = form.require_file().unwrap();
        assert!(stored.file_name.starts_with("cv_final"));
        assert!(stored.file_name.ends_with(".pdf"));
        assert_eq!(stored.path, dir.path().join("resume").join(&stored.file_name));
        assert_eq!(stored.size, 8);
        assert_eq!(stored.content_type, "application/pdf");
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"%PDF-1.4");
    }

    #[actix_web::test]
    async fn test_upload_rejects_wrong_type() {
        let dir = tempfile::tempdir().unwrap();

        let payload = testing::payload(&[testing::file("resume", "cv.png", "image/png", vec![1, 2, 3])]);
        let err = read_upload_form(payload, dir.path(), &DOCUMENT_RESUME).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "Invalid file type. Only PDF and Word files are allowed.");

        let payload = testing::payload(&[testing::file("video", "intro.pdf", "application/pdf", vec![1])]);
        let err = read_upload_form(payload, dir.path(), &VIDEO_RESUME).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid file type. Only video files are allowed.");

        assert!(!dir.path().join("resume").exists());
    }

    #[actix_web::test]
    async fn test_upload_over_limit_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let too_big = vec![b'x'; DOCUMENT_RESUME.max_bytes + 1];
        let payload = testing::payload(&[testing::file("resume", "big.pdf", "application/pdf", too_big)]);

        let err = read_upload_form(payload, dir.path(), &DOCUMENT_RESUME).await.unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds the limit");

        let leftovers = std::fs::read_dir(dir.path().join("resume")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[actix_web::test]
    async fn test_upload_without_file() {
        let dir = tempfile::tempdir().unwrap();

        // a file under another field name is drained, not stored
        let payload = testing::payload(&[
            testing::text("title", "x"),
            testing::file("attachment", "cv.pdf", "application/pdf", b"%PDF".to_vec()),
        ]);
        let form = read_upload_form(payload, dir.path(), &DOCUMENT_RESUME).await.unwrap();
        assert!(form.file.is_none());

        let err = form.require_file().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "No file provided");
    }

    #[actix_web::test]
    async fn test_profile_picture_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let payload = testing::payload(&[
            testing::text("f_name", "Asha"),
            testing::file("profile", "me at work.png", "image/png", vec![0x89, b'P', b'N', b'G']),
        ]);

        let form = read_upload_form(payload, dir.path(), &PROFILE_PICTURE).await.unwrap();
        let stored = form.file.unwrap();
        assert!(stored.file_name.ends_with("_me_at_work.png"));
        assert!(stored.path.starts_with(dir.path().join("user")));
    }

    #[actix_web::test]
    async fn test_text_form_skips_files() {
        let payload = testing::payload(&[
            testing::text("email", "asha@example.com"),
            testing::file("profile", "me.png", "image/png", vec![1, 2]),
            testing::text("password", "hunter22"),
        ]);

        let fields = read_text_form(payload).await.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["email"], "asha@example.com");
        assert_eq!(fields["password"], "hunter22");
    }
}
