use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    tmp: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Command rooted in the isolated temp dir, with the staging area kept
    /// inside it so parallel tests never share staging state.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("vmerge").expect("vmerge binary");
        cmd.current_dir(self.path()).arg("--temp").arg(".");
        cmd
    }

    pub fn output(&self) -> PathBuf {
        self.path().join("merged")
    }

    pub fn bundle(&self, name: &str) -> BundleBuilder {
        BundleBuilder::new(self.path().join(name))
    }

    pub fn read_output(&self, rel: &str) -> String {
        fs::read_to_string(self.output().join(rel)).expect("read merged file")
    }
}

pub struct BundleBuilder {
    root: PathBuf,
}

impl BundleBuilder {
    fn new(root: PathBuf) -> Self {
        fs::create_dir_all(&root).expect("create bundle dir");
        Self { root }
    }

    pub fn manifest(self, text: &str) -> Self {
        fs::write(self.root.join("fxmanifest.lua"), text).expect("write manifest");
        self
    }

    pub fn legacy_manifest(self, text: &str) -> Self {
        fs::write(self.root.join("__resource.lua"), text).expect("write legacy manifest");
        self
    }

    pub fn data_file(self, rel: &str, text: &str) -> Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create data dir");
        }
        fs::write(path, text).expect("write data file");
        self
    }

    pub fn stream_file(self, name: &str) -> Self {
        let dir = self.root.join("stream");
        fs::create_dir_all(&dir).expect("create stream dir");
        fs::write(dir.join(name), name.as_bytes()).expect("write stream file");
        self
    }

    pub fn stream_subdir_file(self, subdir: &str, name: &str) -> Self {
        let dir = self.root.join("stream").join(subdir);
        fs::create_dir_all(&dir).expect("create stream subdir");
        fs::write(dir.join(name), name.as_bytes()).expect("write stream file");
        self
    }
}

pub fn handling_manifest() -> String {
    "fx_version 'cerulean'\ngame 'gta5'\n\n\
     files {\n  'data/handling.meta'\n}\n\
     data_file 'HANDLING_FILE' 'data/handling.meta'\n"
        .to_string()
}

pub fn handling_meta(name: &str, mass: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <CHandlingDataMgr>\n\
         \x20 <HandlingData>\n\
         \x20   <Item type=\"CHandlingData\">\n\
         \x20     <handlingName>{}</handlingName>\n\
         \x20     <fMass value=\"{}\" />\n\
         \x20   </Item>\n\
         \x20 </HandlingData>\n\
         </CHandlingDataMgr>\n",
        name, mass
    )
}

pub fn vehicles_meta(name: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <CVehicleModelInfo__InitDataList>\n\
         \x20 <InitDatas>\n\
         \x20   <Item>\n\
         \x20     <modelName>{}</modelName>\n\
         \x20   </Item>\n\
         \x20 </InitDatas>\n\
         </CVehicleModelInfo__InitDataList>\n",
        name
    )
}
