// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! A stand-in Python toolchain for exercising the pipeline without a network.
//!
//! `python3 -m venv DIR` lays out a fake environment whose `bin/activate`
//! puts a fake `pip3` and `python` first on PATH. The fake pip "installs" a
//! requirement by creating `site-packages/<name>/__init__.py` and rejects
//! anything that is not a bare package name, the way real pip rejects a
//! malformed specifier.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::BuildOptions;

const SITE_PACKAGES: &str = "lib/python3.12/site-packages";

const PYTHON3: &str = r#"#!/bin/sh
set -e
echo "$*" >> "@ROOT@/python3.log"
if [ "$1" != "-m" ] || [ "$2" != "venv" ]; then
    echo "unsupported invocation: $*" >&2
    exit 2
fi
venv="$3"
mkdir -p "$venv/bin" "$venv/@SITE@"
echo "home = @ROOT@" > "$venv/pyvenv.cfg"
printf 'PATH="%s/bin:$PATH"\nexport PATH\n' "$venv" > "$venv/bin/activate"
cp "@ROOT@/pip3" "$venv/bin/pip3"
cp "@ROOT@/python" "$venv/bin/python"
chmod +x "$venv/bin/pip3" "$venv/bin/python"
"#;

const PIP3: &str = r#"#!/bin/sh
site="$(cd "$(dirname "$0")/.." && pwd)/@SITE@"
if [ "$1" != "install" ]; then
    exit 2
fi
if [ "$2" = "--upgrade" ]; then
    echo "Requirement already satisfied: pip"
    exit 0
fi
if [ "$2" = "-r" ]; then
    while IFS= read -r pkg || [ -n "$pkg" ]; do
        case "$pkg" in
            "") ;;
            *[!A-Za-z0-9._-]*)
                echo "ERROR: Invalid requirement: '$pkg'" >&2
                exit 1
                ;;
            *)
                mkdir -p "$site/$pkg"
                printf '# %s\n' "$pkg" > "$site/$pkg/__init__.py"
                echo "Successfully installed $pkg"
                ;;
        esac
    done < "$3"
    exit 0
fi
exit 2
"#;

const PYTHON: &str = r#"#!/bin/sh
root="$(cd "$(dirname "$0")/.." && pwd)"
if [ "$1" = "-c" ]; then
    printf '["%s/@SITE@"]\n' "$root"
    exit 0
fi
exit 2
"#;

pub(crate) struct FakeToolchain {
    _dir: TempDir,
    root: PathBuf,
}

impl FakeToolchain {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        for (name, template) in [("python3", PYTHON3), ("pip3", PIP3), ("python", PYTHON)] {
            let script = template
                .replace("@ROOT@", &root.display().to_string())
                .replace("@SITE@", SITE_PACKAGES);
            write_executable(&root.join(name), &script);
        }
        Self { _dir: dir, root }
    }

    /// Path of the fake base interpreter.
    pub(crate) fn python(&self) -> String {
        self.root.join("python3").display().to_string()
    }

    /// How many times the base interpreter has been invoked.
    pub(crate) fn python_invocations(&self) -> usize {
        std::fs::read_to_string(self.root.join("python3.log"))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    pub(crate) fn options(&self) -> BuildOptions {
        BuildOptions {
            shell: PathBuf::from("/bin/sh"),
            python: self.python(),
            silent: true,
            ..Default::default()
        }
    }
}

/// Site-packages directory inside a fake environment.
pub(crate) fn site_packages(environment: &Path) -> PathBuf {
    environment.join(SITE_PACKAGES)
}

/// Every entry of a zip archive, by name.
pub(crate) fn zip_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        entries.insert(file.name().to_string(), contents);
    }
    entries
}

fn write_executable(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
