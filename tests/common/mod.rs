#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use subwrap::host::{CallShape, Runtime, Value};
use subwrap::wrap::WrapConfig;
use tempfile::TempDir;

/// One recorded hook invocation: (hook, sub name, shape, values).
pub type Event = (&'static str, String, CallShape, Vec<Value>);

#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach recording `pre` and `post` hooks to `config`.
    pub fn attach(&self, config: WrapConfig) -> WrapConfig {
        let pre_log = Rc::clone(&self.events);
        let post_log = Rc::clone(&self.events);
        config
            .pre(move |_, shape, name, values| {
                pre_log
                    .borrow_mut()
                    .push(("pre", name.to_string(), shape, values.to_vec()));
                Ok(())
            })
            .post(move |_, shape, name, values| {
                post_log
                    .borrow_mut()
                    .push(("post", name.to_string(), shape, values.to_vec()));
                Ok(())
            })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn count(&self, hook: &str, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|(h, n, _, _)| *h == hook && n == name)
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// A temporary module tree; `files` maps relative paths to contents.
pub fn module_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (relative, contents) in files {
        write_module(dir.path(), relative, contents);
    }
    dir
}

pub fn write_module(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create module dir");
    }
    fs::write(path, contents).expect("write module");
}

pub fn runtime_over(dir: &TempDir) -> Runtime {
    let mut rt = Runtime::new();
    rt.add_search_path(dir.path());
    rt
}
