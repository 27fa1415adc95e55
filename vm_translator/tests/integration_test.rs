//! Black-box tests driving the `hack-vm-translator` binary end to end.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn unique_temp_dir(label: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("hack_vm_translator_it_{label}_{id}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_translator(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .arg("run")
        .arg("--quiet")
        .arg("--bin")
        .arg("hack-vm-translator")
        .arg("--")
        .args(args)
        .output()
        .expect("failed to execute hack-vm-translator")
}

#[test]
fn test_single_file_arithmetic_and_stack_access() {
    let dir = unique_temp_dir("simple_add");
    let vm_path = dir.join("SimpleAdd.vm");
    fs::write(&vm_path, "push constant 7\npush constant 8\nadd\n").unwrap();

    let output = run_translator(&[vm_path.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "translator failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let asm = fs::read_to_string(dir.join("SimpleAdd.asm")).unwrap();
    assert!(asm.contains("@7"));
    assert!(asm.contains("@8"));
    assert!(asm.contains("D+M"));
    assert!(asm.contains("(END)"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_single_file_rejects_pop_constant() {
    let dir = unique_temp_dir("bad_pop");
    let vm_path = dir.join("Bad.vm");
    fs::write(&vm_path, "pop constant 0\n").unwrap();

    let output = run_translator(&[vm_path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(
        !dir.join("Bad.asm").exists(),
        "a failed translation must not leave a partial .asm behind"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_directory_mode_emits_bootstrap_and_links_multiple_files() {
    let dir = unique_temp_dir("fib_project");
    fs::write(
        dir.join("Sys.vm"),
        "function Sys.init 0\ncall Main.fib 1\nreturn\n",
    )
    .unwrap();
    fs::write(
        dir.join("Main.vm"),
        "function Main.fib 0\n\
         push argument 0\n\
         push constant 2\n\
         lt\n\
         if-goto N_LT_2\n\
         goto N_GE_2\n\
         label N_LT_2\n\
         push argument 0\n\
         return\n\
         label N_GE_2\n\
         push constant 1\n\
         return\n",
    )
    .unwrap();

    let output = run_translator(&[dir.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "translator failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let dir_name = dir.file_name().unwrap().to_string_lossy().into_owned();
    let asm_path = dir.join(format!("{dir_name}.asm"));
    let asm = fs::read_to_string(&asm_path).unwrap();

    assert!(asm.contains("bootstrap"));
    assert!(asm.contains("@Sys.init\n0;JMP"));
    assert!(asm.contains("(Main.fib$N_LT_2)"));
    assert!(asm.contains("(Main.fib$N_GE_2)"));
    assert!(asm.contains("(END)"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_directory_mode_rejects_empty_directory() {
    let dir = unique_temp_dir("empty");
    let output = run_translator(&[dir.to_str().unwrap()]);
    assert!(!output.status.success());
    fs::remove_dir_all(&dir).unwrap();
}

