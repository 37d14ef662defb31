//! Shelf photo discovery, validation and hashing

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use walkdir::WalkDir;

use planocheck_types::{Error, Result};

/// Extensions accepted for shelf photos, lowercase
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Lowercased extension of `path` if it names a supported shelf photo
pub fn image_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

pub fn is_supported_image(path: &Path) -> bool {
    image_extension(path).is_some()
}

/// Check that a shelf photo exists and decodes to a non-empty image.
/// Returns the normalized extension used when storing a copy.
pub fn validate_image(path: &Path) -> Result<String> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(Error::InvalidImageFormat(format!(
            "{}: not a regular file",
            path.display()
        )));
    }

    let ext = image_extension(path).ok_or_else(|| {
        Error::InvalidImageFormat(format!(
            "{}: expected one of {}",
            path.display(),
            IMAGE_EXTENSIONS.join(", ")
        ))
    })?;

    let shelf = image::open(path)?;
    if shelf.width() == 0 || shelf.height() == 0 {
        return Err(Error::InvalidImageFormat(format!("{}: empty image", path.display())));
    }
    debug!("{}: {}x{} {}", path.display(), shelf.width(), shelf.height(), ext);
    Ok(ext)
}

/// SHA-256 of a file, hex encoded
pub fn hash_image(image_path: &Path) -> Result<String> {
    let file = File::open(image_path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Collect shelf photos under `dir`, in path order
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(if dir.exists() {
            Error::InvalidImageFormat(format!("{}: not a directory", dir.display()))
        } else {
            Error::FileNotFound(dir.display().to_string())
        });
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_supported_image(entry.path()) => {
                images.push(entry.into_path())
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry under {}: {}", dir.display(), e),
        }
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_image(Path::new("shelf.JPG")));
        assert!(is_supported_image(Path::new("a/b/shelf.png")));
        assert!(!is_supported_image(Path::new("shelf.txt")));
        assert!(!is_supported_image(Path::new("shelf")));
    }

    #[test]
    fn test_image_extension_is_lowercased() {
        assert_eq!(image_extension(Path::new("IMG_0042.JPEG")), Some("jpeg".to_string()));
        assert_eq!(image_extension(Path::new("shelf.gif")), None);
    }

    #[test]
    fn test_validate_real_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shelf.PNG");
        image::RgbImage::new(8, 8).save_with_format(&path, image::ImageFormat::Png).unwrap();
        assert_eq!(validate_image(&path).unwrap(), "png");
    }

    #[test]
    fn test_validate_rejects_directory() {
        let dir = tempdir().unwrap();
        let err = validate_image(dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidImageFormat(_)));
    }

    #[test]
    fn test_validate_rejects_corrupt_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shelf.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();
        let err = validate_image(&path).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_validate_missing() {
        let err = validate_image(Path::new("/nonexistent/shelf.jpg")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_hash_is_stable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            hash_image(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_scan_directory_sorted() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        for name in ["b.jpg", "a.png", "notes.txt", "sub/c.jpeg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let names: Vec<String> = scan_directory(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "c.jpeg"]);
    }
}
