use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shiku::clipboard::{Clipboard, ClipboardError};
use shiku::route::Location;
use shiku::search::{filter_poems, filter_poets};
use shiku::{App, Corpus, DirectoryCorpus, Phase};
use tempfile::tempdir;

struct NullClipboard;

impl Clipboard for NullClipboard {
    fn set(&mut self, _contents: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

fn write_corpus(root: &Path) {
    fs::create_dir_all(root.join("data/poets")).unwrap();
    fs::write(
        root.join("poets.json"),
        r#"[{"id":"libai","name":"李白","pinyin":"libai","poemCount":2},
            {"id":"dufu","name":"杜甫","pinyin":"dufu","poemCount":1}]"#,
    )
    .unwrap();
    fs::write(
        root.join("poems.json"),
        r#"[{"t":"静夜思","p":"李白","i":"libai","x":0},
            {"t":"月下独酌","p":"李白","i":"libai","x":1},
            {"t":"春望","p":"杜甫","i":"dufu","x":0}]"#,
    )
    .unwrap();
    fs::write(
        root.join("data/poets/libai.json"),
        r#"{"id":"libai","name":"李白","pinyin":"libai","poems":[
            {"title":"静夜思","date":"","content":"床前明月光\n疑是地上霜"},
            {"title":"月下独酌","date":"","content":"花间一壶酒\n独酌无相亲"}]}"#,
    )
    .unwrap();
}

fn wait_until(app: &mut App, done: impl Fn(&App) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(app) {
        assert!(Instant::now() < deadline, "timed out waiting for the app");
        std::thread::sleep(Duration::from_millis(10));
        app.tick(Instant::now());
    }
}

#[test]
fn reads_the_published_layout() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let corpus = DirectoryCorpus::new(dir.path().to_path_buf());

    let poets = corpus.fetch_poets().unwrap();
    let poems = corpus.fetch_poems().unwrap();
    assert_eq!(poets.len(), 2);
    assert_eq!(filter_poets(&poets, "李白"), vec![0]);
    assert_eq!(filter_poems(&poems, "月"), vec![1]);

    let detail = corpus.fetch_poet("libai").unwrap();
    assert_eq!(detail.poems.len(), 2);
    assert!(corpus.fetch_poet("dufu").unwrap_err().is_not_found());
}

#[test]
fn app_opens_a_shared_link_and_degrades_on_missing_poets() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let corpus: Arc<dyn Corpus> = Arc::new(DirectoryCorpus::new(dir.path().to_path_buf()));

    let mut app = App::new(
        corpus.clone(),
        Box::new(NullClipboard),
        "https://poems.example",
        Location::parse("https://poems.example/poet/libai#poem-1"),
    );
    wait_until(&mut app, |app| app.phase() != Phase::DetailLoading);
    assert_eq!(app.phase(), Phase::DetailReady);
    assert_eq!(app.current_url(), "https://poems.example/poet/libai#poem-1");

    let mut app = App::new(
        corpus,
        Box::new(NullClipboard),
        "https://poems.example",
        Location::parse("/poet/dufu"),
    );
    wait_until(&mut app, |app| app.phase() != Phase::DetailLoading);
    assert_eq!(app.phase(), Phase::DetailError);
}
