//! Black-box tests driving the `hack-jack-compiler` binary end to end.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn unique_temp_dir(label: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("hack_jack_compiler_it_{label}_{id}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_compiler(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .arg("run")
        .arg("--quiet")
        .arg("--bin")
        .arg("hack-jack-compiler")
        .arg("--")
        .args(args)
        .output()
        .expect("failed to execute hack-jack-compiler")
}

#[test]
fn test_compiles_minimal_class_to_vm() {
    let dir = unique_temp_dir("minimal");
    let src = dir.join("Main.jack");
    fs::write(&src, "class Main { function void main() { return; } }").unwrap();

    let output = run_compiler(&[src.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "compiler failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let vm = fs::read_to_string(dir.join("Main.vm")).unwrap();
    assert_eq!(vm, "function Main.main 0\npush constant 0\nreturn\n");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_if_else_labeling() {
    let dir = unique_temp_dir("if_else");
    let src = dir.join("Main.jack");
    fs::write(
        &src,
        "class Main {\n\
         function void main() {\n\
         var boolean x;\n\
         var int y;\n\
         if (x) { let y = 1; } else { let y = 2; }\n\
         return;\n\
         }\n\
         }",
    )
    .unwrap();

    let output = run_compiler(&[src.to_str().unwrap()]);
    assert!(output.status.success());

    let vm = fs::read_to_string(dir.join("Main.vm")).unwrap();
    assert_eq!(
        vm,
        "function Main.main 2\n\
         push local 0\n\
         not\n\
         if-goto ELSE0\n\
         push constant 1\n\
         pop local 1\n\
         goto IF0\n\
         label ELSE0\n\
         push constant 2\n\
         pop local 1\n\
         label IF0\n\
         push constant 0\n\
         return\n"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_rejects_unterminated_string() {
    let dir = unique_temp_dir("bad_string");
    let src = dir.join("Main.jack");
    fs::write(
        &src,
        "class Main { function void main() { do Output.printString(\"oops); return; } }",
    )
    .unwrap();

    let output = run_compiler(&[src.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(!dir.join("Main.vm").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_directory_mode_compiles_each_class_independently() {
    let dir = unique_temp_dir("multi");
    fs::write(
        dir.join("Main.jack"),
        "class Main { function void main() { do Helper.run(); return; } }",
    )
    .unwrap();
    fs::write(
        dir.join("Helper.jack"),
        "class Helper { function void run() { return; } }",
    )
    .unwrap();

    let output = run_compiler(&[dir.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "compiler failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(dir.join("Main.vm").exists());
    assert!(dir.join("Helper.vm").exists());

    let main_vm = fs::read_to_string(dir.join("Main.vm")).unwrap();
    assert!(main_vm.contains("call Helper.run 0"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_directory_mode_rejects_empty_directory() {
    let dir = unique_temp_dir("empty");
    let output = run_compiler(&[dir.to_str().unwrap()]);
    assert!(!output.status.success());
    fs::remove_dir_all(&dir).unwrap();
}
