//! In-process stand-ins for the network and external programs.

#![allow(dead_code)]

use gogrepoc_appimage::bundler::{
    AppImageSettings, Arch, BuildConfig, BuildConfigBuilder, Error, Result,
    utils::{
        http::Fetcher,
        process::{CommandOutput, CommandRunner, Invocation},
    },
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const COMMIT_SHA: &str = "1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d";

pub const PAYLOAD: &str = "#!/usr/bin/env python\n\
__appname__ = 'gogrepoc.py'\n\
__version__ = '0.4.0-a'\n\
print('usage: gogrepoc.py')\n";

/// Configuration rooted in `root` for an x86_64 host.
///
/// Only `sh` is required on `PATH` so the suite runs on minimal hosts.
pub fn config(root: &Path, target: Option<&str>) -> BuildConfig {
    config_builder(root, target).build().unwrap()
}

pub fn config_builder(root: &Path, target: Option<&str>) -> BuildConfigBuilder {
    BuildConfigBuilder::new()
        .appimage_settings(AppImageSettings {
            required_tools: vec!["sh".into()],
            ..Default::default()
        })
        .host_arch(Arch::X86_64)
        .target_arch(target.map(String::from))
        .scratch_dir(root.join("scratch"))
        .output_dir(root.join("out"))
        .tools_dir(root.join("tools"))
}

/// Minimal ELF header so the optimizer treats the file as strippable.
pub fn elf_header() -> Vec<u8> {
    let mut header = vec![0u8; 64];
    header[..4].copy_from_slice(b"\x7fELF");
    header[4] = 2;
    header[5] = 1;
    header[6] = 1;
    header
}

pub fn write(path: &Path, contents: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

pub fn write_executable(path: &Path, contents: &[u8]) {
    write(path, contents);
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Serves canned responses for every URL the build touches.
#[derive(Default)]
pub struct FakeFetcher {
    /// Revision lookups fail when set.
    pub api_down: bool,
    /// Downloads whose URL contains this text fail.
    pub fail_download: Option<&'static str>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn requested(&self, needle: &str) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(needle))
            .cloned()
            .collect()
    }
}

impl Fetcher for FakeFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.api_down {
            return Err(Error::Download {
                url: url.into(),
                reason: "503 Service Unavailable".into(),
            });
        }
        Ok(format!(r#"[{{"sha":"{COMMIT_SHA}","commit":{{"message":"fix"}}}}]"#))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.fail_download.is_some_and(|needle| url.contains(needle)) {
            return Err(Error::Download {
                url: url.into(),
                reason: "404 Not Found".into(),
            });
        }
        let body: &[u8] = if url.ends_with(".sh") {
            b"#!/bin/sh\n# miniconda installer\n"
        } else if url.ends_with("gogrepoc.py") {
            PAYLOAD.as_bytes()
        } else {
            b"appimagetool"
        };
        std::fs::write(dest, body).unwrap();
        Ok(())
    }
}

/// Simulates the installer, conda, pip, ldd, strip, appimagetool and the
/// finished AppImage by creating the files each would create.
pub struct FakeRunner {
    /// Directory holding "system" libraries reported by ldd.
    pub host_libs: PathBuf,
    pub fail_optional: bool,
    pub fail_create: bool,
    pub calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new(root: &Path) -> Self {
        let host_libs = root.join("host-lib");
        write(&host_libs.join("libssl.so.3"), b"ssl");
        write(&host_libs.join("libm.so.6"), b"libm");
        Self {
            host_libs,
            fail_optional: false,
            fail_create: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| inv.program_name().starts_with(program))
            .cloned()
            .collect()
    }

    fn create_env(&self, conda: &Path, invocation: &Invocation) {
        let args = invocation.args_lossy();
        let name_index = args.iter().position(|a| a == "-n").unwrap() + 1;
        let prefix = conda.parent().unwrap().parent().unwrap();
        let env = prefix.join("envs").join(&args[name_index]);

        write_executable(&env.join("bin/python3.11"), &elf_header());
        std::os::unix::fs::symlink("python3.11", env.join("bin/python")).unwrap();
        write(&env.join("lib/libpython3.11.so.1.0"), b"libpython");
        write(&env.join("lib/python3.11/os.py"), b"# os");
        write(&env.join("lib/python3.11/__pycache__/os.cpython-311.pyc"), b"pyc");
        write(&env.join("lib/python3.11/test/test_os.py"), b"# test");
        write(&env.join("include/python3.11/Python.h"), b"/* header */");
        write(&env.join("conda-meta/history"), b"==> create <==");
    }

    fn ldd_output(&self, python: &Path) -> String {
        let usr_lib = python.parent().unwrap().parent().unwrap().join("lib");
        format!(
            "\tlinux-vdso.so.1 (0x00007ffc8d5f2000)\n\
             \tlibpython3.11.so.1.0 => {} (0x00007f1d2c000000)\n\
             \tlibssl.so.3 => {} (0x00007f1d2bf00000)\n\
             \tlibm.so.6 => {} (0x00007f1d2be00000)\n\
             \t/lib64/ld-linux-x86-64.so.2 (0x00007f1d2c600000)\n",
            usr_lib.join("libpython3.11.so.1.0").display(),
            self.host_libs.join("libssl.so.3").display(),
            self.host_libs.join("libm.so.6").display(),
        )
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let name = invocation.program_name();
        let args = invocation.args_lossy();

        let output = match name.as_str() {
            "bash" => {
                let prefix = Path::new(&args[3]);
                write_executable(&prefix.join("bin/conda"), b"#!/bin/sh\n");
                CommandOutput::ok("PREFIX installed\n")
            }
            "conda" if args[0] == "create" => {
                if self.fail_create {
                    CommandOutput::failed(1, "PackagesNotFoundError: python=3.11")
                } else {
                    self.create_env(invocation.program(), invocation);
                    CommandOutput::ok("")
                }
            }
            "conda" if self.fail_optional => {
                CommandOutput::failed(1, "UnsatisfiableError: tk conflicts")
            }
            "conda" | "python" | "strip" => CommandOutput::ok(""),
            "ldd" => CommandOutput::ok(self.ldd_output(Path::new(&args[0]))),
            tool if tool.starts_with("appimagetool") => {
                write(Path::new(args.last().unwrap()), b"\x7fELF appimage");
                CommandOutput::ok("Success\n")
            }
            artifact if artifact.ends_with(".AppImage") => {
                CommandOutput::ok("usage: gogrepoc.py [-h] {login,update,download} ...\n")
            }
            other => CommandOutput::failed(127, format!("{other}: command not found")),
        };
        Ok(output)
    }
}
