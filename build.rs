use std::{env, path::PathBuf};

// ffmpeg-sys-next finds FFmpeg through pkg-config everywhere except Windows,
// where it needs FFMPEG_DIR. Point users at a vcpkg install when one exists.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=frameseek: FFMPEG_DIR is not set; on Windows install FFmpeg (e.g. with vcpkg) and set FFMPEG_DIR."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.exists() {
        println!(
            "cargo:warning=frameseek: found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to use it explicitly.",
            candidate.display(),
        );
        if env::var_os("VCPKGRS_DYNAMIC").is_none() {
            println!("cargo:warning=frameseek: set VCPKGRS_DYNAMIC=1 for dynamic vcpkg FFmpeg builds.");
        }
    } else {
        println!(
            "cargo:warning=frameseek: VCPKG_ROOT is set but {} does not exist.",
            candidate.display(),
        );
    }
}
