//! Book-format reader for host builds.
//!
//! EPUB metadata and cover art come from the `epub` crate; cover images
//! are decoded with `image`, scaled to the grid thumbnail height and
//! cached as BMP files so later visits skip the container entirely.
//! Plain-text formats have no embedded metadata and always use the
//! filename as their title.

use std::fs;
use std::path::{Path, PathBuf};

use epub::doc::EpubDoc;

use crate::book::{title_from_filename, BookCover, BookReader, CoverBitmap};
use crate::storage::basename;

pub struct FormatBookReader {
    cache_dir: PathBuf,
}

impl FormatBookReader {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache file for one (book, height) pair. FNV-1a over the book
    /// path keeps the name stable across runs without keeping an index.
    fn thumb_path(&self, book_path: &str, thumb_height: u32) -> PathBuf {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in book_path.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        self.cache_dir
            .join(format!("{:016x}-{}.bmp", hash, thumb_height))
    }

    fn load_epub(&self, path: &str, thumb_height: u32) -> Result<BookCover, String> {
        let mut doc = EpubDoc::new(path).map_err(|e| e.to_string())?;
        let title = doc
            .mdata("title")
            .map(|item| item.value.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_from_filename(basename(path)));

        let cover_bmp_path = match doc.get_cover() {
            Some((data, _mime)) => self
                .render_thumbnail(&data, path, thumb_height)
                .unwrap_or_else(|err| {
                    log::debug!("cover render failed for '{}': {}", path, err);
                    String::new()
                }),
            None => String::new(),
        };

        Ok(BookCover {
            title,
            cover_bmp_path,
        })
    }

    fn render_thumbnail(
        &self,
        data: &[u8],
        book_path: &str,
        thumb_height: u32,
    ) -> Result<String, String> {
        let target = self.thumb_path(book_path, thumb_height);
        if !target.exists() {
            let decoded = image::load_from_memory(data).map_err(|e| e.to_string())?;
            let thumb = decoded.thumbnail(thumb_height, thumb_height);
            fs::create_dir_all(&self.cache_dir).map_err(|e| e.to_string())?;
            thumb.save(&target).map_err(|e| e.to_string())?;
        }
        Ok(target.to_string_lossy().into_owned())
    }
}

impl BookReader for FormatBookReader {
    fn load_book(&mut self, path: &str, thumb_height: u32) -> BookCover {
        let is_epub = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"));
        if is_epub {
            match self.load_epub(path, thumb_height) {
                Ok(cover) => return cover,
                Err(err) => log::debug!("failed to open '{}': {}", path, err),
            }
        }
        // Text formats and unreadable books alike keep the filename.
        BookCover {
            title: title_from_filename(basename(path)),
            cover_bmp_path: String::new(),
        }
    }

    fn read_thumbnail(&mut self, bmp_path: &str) -> Option<CoverBitmap> {
        let decoded = match image::open(bmp_path) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::debug!("failed to read thumbnail '{}': {}", bmp_path, err);
                return None;
            }
        };
        let luma = decoded.to_luma8();
        Some(CoverBitmap::from_luma(
            luma.width(),
            luma.height(),
            luma.as_raw(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_minimal_epub(path: &Path, title: &str) {
        let stored = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        let mut archive = zip::ZipWriter::new(fs::File::create(path).unwrap());

        archive.start_file("mimetype", stored).unwrap();
        archive.write_all(b"application/epub+zip").unwrap();

        archive.start_file("META-INF/container.xml", stored).unwrap();
        archive
            .write_all(
                br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
            )
            .unwrap();

        archive.start_file("content.opf", stored).unwrap();
        archive
            .write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="pub-id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{}</dc:title>
    <dc:identifier id="pub-id">urn:uuid:4add9f66-0932-4e73-a038-dcb5d4ab0f34</dc:identifier>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
  </spine>
</package>"#,
                    title
                )
                .as_bytes(),
            )
            .unwrap();

        archive.start_file("ch1.xhtml", stored).unwrap();
        archive
            .write_all(b"<html><body><p>hello</p></body></html>")
            .unwrap();

        archive.finish().unwrap();
    }

    #[test]
    fn epub_title_comes_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("arcturus.epub");
        write_minimal_epub(&book, "A Voyage to Arcturus");

        let mut reader = FormatBookReader::new(dir.path().join("cache"));
        let cover = reader.load_book(book.to_str().unwrap(), 180);
        assert_eq!(cover.title, "A Voyage to Arcturus");
        assert_eq!(cover.cover_bmp_path, "");
    }

    #[test]
    fn blank_epub_title_falls_back_to_filename() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("untitled.epub");
        write_minimal_epub(&book, "");

        let mut reader = FormatBookReader::new(dir.path().join("cache"));
        let cover = reader.load_book(book.to_str().unwrap(), 180);
        assert_eq!(cover.title, "untitled");
    }

    #[test]
    fn text_formats_use_filename_titles() {
        let cache = tempfile::tempdir().unwrap();
        let mut reader = FormatBookReader::new(cache.path());

        let cover = reader.load_book("/books/field notes.txt", 180);
        assert_eq!(cover.title, "field notes");
        assert_eq!(cover.cover_bmp_path, "");

        let cover = reader.load_book("/books/journal.md", 180);
        assert_eq!(cover.title, "journal");
    }

    #[test]
    fn corrupt_epub_falls_back_to_filename() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("broken.epub");
        fs::write(&book, b"not a zip archive").unwrap();

        let mut reader = FormatBookReader::new(dir.path().join("cache"));
        let cover = reader.load_book(book.to_str().unwrap(), 180);
        assert_eq!(cover.title, "broken");
        assert_eq!(cover.cover_bmp_path, "");
    }

    #[test]
    fn thumb_paths_differ_per_book_and_height() {
        let reader = FormatBookReader::new("/tmp/covers");
        let a = reader.thumb_path("/books/a.epub", 180);
        let b = reader.thumb_path("/books/b.epub", 180);
        let tall = reader.thumb_path("/books/a.epub", 240);
        assert_ne!(a, b);
        assert_ne!(a, tall);
        assert_eq!(a, reader.thumb_path("/books/a.epub", 180));
    }

    #[test]
    fn thumbnails_round_through_bmp() {
        let dir = tempfile::tempdir().unwrap();
        let bmp_path = dir.path().join("cover.bmp");
        let mut img = image::GrayImage::from_pixel(8, 8, image::Luma([0xFFu8]));
        for y in 0..4 {
            for x in 0..8 {
                img.put_pixel(x, y, image::Luma([0x00]));
            }
        }
        img.save(&bmp_path).unwrap();

        let mut reader = FormatBookReader::new(dir.path());
        let bitmap = reader.read_thumbnail(bmp_path.to_str().unwrap()).unwrap();
        assert_eq!(bitmap.width(), 8);
        assert_eq!(bitmap.height(), 8);
        assert!(bitmap.is_black(0, 0));
        assert!(!bitmap.is_black(0, 7));
    }
}
