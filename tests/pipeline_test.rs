use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use epub_prune::{Config, Error, Step, process_epub, run_batch};

const PAGE_WITH_JPEG: &str = "<html>\n<head><title>p1</title></head>\n\
<body>\n<p>a caption\nspanning lines</p>\n<img src=\"images/img1.jpeg\"/>\n</body>\n</html>\n";

const PAGE_WITH_PNG: &str = "<html>\n<head><title>p2</title></head>\n\
<body>\n<img src=\"images/img2.png\"/>\n</body>\n</html>\n";

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <manifest>
    <item href="page1.html" id="chapter_1" media-type="text/html"/>
    <item href="page2.html" id="chapter_2" media-type="text/html"/>
    <item href="images/img1.jpeg" id="img_1" media-type="image/jpeg"/>
    <item href="images/img2.png" id="img_2" media-type="image/png"/>
  </manifest>
</package>
"#;

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

fn build_volume01(path: &Path) {
    write_zip(
        path,
        &[
            ("mimetype", b"application/epub+zip"),
            ("OEBPS/content.opf", MANIFEST.as_bytes()),
            ("OEBPS/page1.html", PAGE_WITH_JPEG.as_bytes()),
            ("OEBPS/page2.html", PAGE_WITH_PNG.as_bytes()),
            ("OEBPS/images/img1.jpeg", b"\xff\xd8\xff\xe0"),
            ("OEBPS/images/img2.png", b"\x89PNG"),
        ],
    );
}

fn entry_names(archive_path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

fn entry_bytes(archive_path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

struct Dirs {
    _root: tempfile::TempDir,
    input: PathBuf,
    scratch: PathBuf,
    output: PathBuf,
}

fn setup_dirs() -> Dirs {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("input");
    let scratch = root.path().join("scratch");
    let output = root.path().join("output");
    fs::create_dir_all(&input).unwrap();
    Dirs {
        _root: root,
        input,
        scratch,
        output,
    }
}

#[test]
fn removes_imageless_page_and_its_manifest_item() {
    let dirs = setup_dirs();
    let epub = dirs.input.join("Volume01.epub");
    build_volume01(&epub);
    fs::create_dir_all(&dirs.scratch).unwrap();
    fs::create_dir_all(&dirs.output).unwrap();

    let outcome = process_epub(&epub, &dirs.scratch, &dirs.output);
    assert!(outcome.is_success(), "pipeline failed: {:?}", outcome.error);
    assert_eq!(outcome.removed_pages, 1);

    let processed = dirs.output.join("Volume01_processed.epub");
    assert_eq!(processed, outcome.output);

    let names = entry_names(&processed);
    assert!(names.contains(&"OEBPS/page1.html".to_string()));
    assert!(!names.contains(&"OEBPS/page2.html".to_string()));
    assert!(names.contains(&"OEBPS/images/img2.png".to_string()));

    // Surviving page is stripped of its <p> span.
    let page1 = String::from_utf8(entry_bytes(&processed, "OEBPS/page1.html")).unwrap();
    assert!(!page1.contains("<p>"));
    assert!(!page1.contains("a caption"));
    assert!(page1.contains("img1.jpeg"));

    // Manifest drops the removed page but keeps everything else.
    let opf = String::from_utf8(entry_bytes(&processed, "OEBPS/content.opf")).unwrap();
    assert!(!opf.contains(r#"href="page2.html""#));
    assert!(opf.contains(r#"href="page1.html""#));
    assert!(opf.contains(r#"href="images/img2.png""#));
}

#[test]
fn archive_with_no_jpeg_pages_loses_all_pages() {
    let dirs = setup_dirs();
    let epub = dirs.input.join("NoJpeg.epub");
    write_zip(
        &epub,
        &[
            ("OEBPS/content.opf", MANIFEST.as_bytes()),
            ("OEBPS/page1.html", PAGE_WITH_PNG.as_bytes()),
            ("OEBPS/page2.html", PAGE_WITH_PNG.as_bytes()),
        ],
    );
    fs::create_dir_all(&dirs.scratch).unwrap();
    fs::create_dir_all(&dirs.output).unwrap();

    let outcome = process_epub(&epub, &dirs.scratch, &dirs.output);
    assert!(outcome.is_success());
    assert_eq!(outcome.removed_pages, 2);

    let names = entry_names(&outcome.output);
    assert!(names.iter().all(|n| !n.ends_with(".html")));

    let opf = String::from_utf8(entry_bytes(&outcome.output, "OEBPS/content.opf")).unwrap();
    assert!(!opf.contains("text/html"));
}

#[test]
fn archive_with_no_removable_pages_roundtrips() {
    let dirs = setup_dirs();
    let epub = dirs.input.join("Untouched.epub");
    // No page*.html entries at all, so nothing is removed or rewritten.
    write_zip(
        &epub,
        &[
            ("mimetype", b"application/epub+zip"),
            ("OEBPS/content.opf", MANIFEST.as_bytes()),
            ("OEBPS/chapter1.html", PAGE_WITH_PNG.as_bytes()),
            ("OEBPS/images/img1.jpeg", b"\xff\xd8\xff\xe0"),
        ],
    );
    fs::create_dir_all(&dirs.scratch).unwrap();
    fs::create_dir_all(&dirs.output).unwrap();

    let outcome = process_epub(&epub, &dirs.scratch, &dirs.output);
    assert!(outcome.is_success());
    assert_eq!(outcome.removed_pages, 0);

    assert_eq!(entry_names(&epub), entry_names(&outcome.output));
    for name in entry_names(&epub) {
        assert_eq!(
            entry_bytes(&epub, &name),
            entry_bytes(&outcome.output, &name),
            "entry {name} changed"
        );
    }
}

#[test]
fn missing_manifest_fails_without_stopping_the_batch() {
    let dirs = setup_dirs();
    build_volume01(&dirs.input.join("Good.epub"));
    write_zip(
        &dirs.input.join("Broken.epub"),
        &[("OEBPS/page1.html", PAGE_WITH_JPEG.as_bytes())],
    );

    let config = Config::new(&dirs.input, &dirs.scratch, &dirs.output).with_jobs(2);
    let mut outcomes = run_batch(&config).unwrap();
    assert_eq!(outcomes.len(), 2);
    outcomes.sort_by(|a, b| a.input.cmp(&b.input));

    let broken = &outcomes[0];
    assert!(broken.input.ends_with("Broken.epub"));
    match &broken.error {
        Some((Step::UpdateManifest, Error::ManifestNotFound(_))) => {}
        other => panic!("expected manifest-not-found, got {other:?}"),
    }

    let good = &outcomes[1];
    assert!(good.is_success());
    assert!(dirs.output.join("Good_processed.epub").exists());

    // The failed archive keeps its scratch tree for inspection; the
    // successful one is cleaned up.
    assert!(dirs.scratch.join("Broken").exists());
    assert!(!dirs.scratch.join("Good").exists());
}

#[test]
fn existing_destination_is_not_overwritten() {
    let dirs = setup_dirs();
    let epub = dirs.input.join("Volume01.epub");
    build_volume01(&epub);
    fs::create_dir_all(&dirs.scratch).unwrap();
    fs::create_dir_all(&dirs.output).unwrap();

    let existing = dirs.output.join("Volume01_processed.epub");
    fs::write(&existing, "precious").unwrap();

    let outcome = process_epub(&epub, &dirs.scratch, &dirs.output);
    match &outcome.error {
        Some((Step::Repack, Error::OutputExists(_))) => {}
        other => panic!("expected output-exists at repack, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&existing).unwrap(), "precious");
    // Failed run: scratch tree survives.
    assert!(dirs.scratch.join("Volume01").exists());
}

#[test]
fn scratch_tree_is_removed_on_success() {
    let dirs = setup_dirs();
    build_volume01(&dirs.input.join("Volume01.epub"));

    let config = Config::new(&dirs.input, &dirs.scratch, &dirs.output);
    let outcomes = run_batch(&config).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_success());
    assert!(!dirs.scratch.join("Volume01").exists());
}

#[test]
fn empty_input_directory_yields_empty_batch() {
    let dirs = setup_dirs();
    let config = Config::new(&dirs.input, &dirs.scratch, &dirs.output);
    let outcomes = run_batch(&config).unwrap();
    assert!(outcomes.is_empty());
}
