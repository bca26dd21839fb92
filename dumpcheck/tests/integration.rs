//! Integration tests for dumpcheck
//!
//! Tests the full verification pipeline:
//! - Naming and locating dumps in a dump directory
//! - Loading dumps from disk
//! - Ordered scan-forward and next-line checks
//! - Failure diagnostics

use std::fs;
use std::path::{Path, PathBuf};

use dumpcheck::{
    CheckPlan, CompilationUnitId, CursorState, DumpDocument, DumpPolicy, FailureKind, NextLineMode,
    Resolver, Verifier, VerifyError, VerifyOptions,
};

/// Unoptimized dump of an intrinsic that calls a HotSpot stub
const TAN_DUMP: &str = r#"; ModuleID = 'compiler_jeandle_intrinsic_TestTanDouble$TestWrapper_tan_double_(D)D'
source_filename = "compiler_jeandle_intrinsic_TestTanDouble$TestWrapper_tan_double_(D)D"

define hotspotcc double @"compiler_jeandle_intrinsic_TestTanDouble$TestWrapper_tan_double_(D)D"(double %0) #0 gc "hotspotgc" {
entry:
  br label %bci_0

bci_0:
  %1 = call double @StubRoutines_dtan(double %0)
  ret double %1
}
"#;

/// Dump of a field access guarded by an implicit null check
const NULL_CHECK_DUMP: &str = "define hotspotcc i32 @\"compiler_jeandle_TestNullCheck_testAccess_(Lcompiler_jeandle_TestNullCheck$MyClass;)I\"(ptr addrspace(1) %0) {
entry:
  br label %bci_0

bci_0:
  %1 = icmp eq ptr addrspace(1) %0, null
  br i1 %1, label %bci_1_null_check_fail, label %bci_1_null_check_pass, !make.implicit !0

bci_1_null_check_pass:
  %2 = getelementptr inbounds i8, ptr addrspace(1) %0, i64 12
  %3 = load i32, ptr addrspace(1) %2, align 4
  ret i32 %3

bci_1_null_check_fail:
  call hotspotcc void @throw_NullPointerException()
  unreachable
}
";

fn tan_double() -> CompilationUnitId {
    CompilationUnitId::new("compiler.jeandle.intrinsic.TestTanDouble$TestWrapper", "tan_double")
        .param("double")
        .returns("double")
}

fn test_access() -> CompilationUnitId {
    CompilationUnitId::new("compiler.jeandle.TestNullCheck", "testAccess")
        .param("compiler.jeandle.TestNullCheck$MyClass")
        .returns("int")
}

/// Helper to write a dump where the JIT would put it
fn write_dump(dir: &Path, unit: &CompilationUnitId, optimized: bool, text: &str) -> PathBuf {
    let path = Resolver::new(dir).optimized(optimized).resolve(unit);
    fs::write(&path, text).unwrap();
    path
}

fn verifier(lines: &[&str]) -> Verifier {
    Verifier::new(DumpDocument::from_lines(lines.iter().copied()))
}

// ============================================
// Ordered Check Scenarios
// ============================================

#[test]
fn test_scan_next_scan_sequence() {
    let mut v = verifier(&["entry:", "br label %x", "x:", "ret void"]);
    v.check("entry:").unwrap();
    v.check_next("br label %x").unwrap();
    v.check("ret void").unwrap();
    assert_eq!(v.state(), CursorState::Active(4));
}

#[test]
fn test_next_line_first_reports_expected_and_actual() {
    let mut v = verifier(&["entry:", "br label %x", "x:", "ret void"]);
    let err = v.check_next("x:").unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnexpectedLine);
    assert_eq!(err.expected(), Some("x:"));
    match &err {
        VerifyError::UnexpectedLine { actual, .. } => assert_eq!(actual, "entry:"),
        other => panic!("expected UnexpectedLine, got {other:?}"),
    }
}

#[test]
fn test_empty_document_not_found() {
    let mut v = verifier(&[]);
    let err = v.check("anything").unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotFound);
    assert!(err.to_string().ends_with("remaining input: <empty>"));
}

#[test]
fn test_llvm_intrinsic_pattern() {
    let mut v = verifier(&["entry:", "call double @llvm.fabs.f64(double %0)", "ret double %1"]);
    let m = v.check_pattern("call \\w+ @llvm\\.\\w+").unwrap();
    assert_eq!(m.line, 1);
    assert_eq!(v.cursor(), Some(2));
}

#[test]
fn test_same_literal_twice_advances() {
    let mut v = verifier(&["a", "b", "safepoint", "c", "d", "safepoint", "e"]);
    assert_eq!(v.check("safepoint").unwrap().line, 2);
    assert_eq!(v.cursor(), Some(3));
    assert_eq!(v.check("safepoint").unwrap().line, 5);
    assert_eq!(v.cursor(), Some(6));
}

#[test]
fn test_ordering_holds_for_every_pair() {
    let lines: Vec<String> = (0..20).map(|i| format!("inst {i}")).collect();
    for first in 0..20 {
        for second in 0..20 {
            let mut v = Verifier::new(DumpDocument::from_lines(lines.clone()));
            v.check(&format!("inst {first}")).unwrap();
            let result = v.check(&format!("inst {second}"));
            // "inst 1" is a substring of "inst 1x", so only exact-position hits are predictable
            if second > first {
                assert!(result.unwrap().line > first);
            } else if let Ok(m) = result {
                assert!(m.line > first, "matched line {} behind cursor {}", m.line, first + 1);
            }
        }
    }
}

#[test]
fn test_next_line_ignores_later_occurrence() {
    let mut v = verifier(&["entry:", "  br label %bci_0", "bci_0:", "x:"]);
    v.check("entry:").unwrap();
    assert_eq!(v.check_next("x:").unwrap_err().kind(), FailureKind::UnexpectedLine);
}

#[test]
fn test_exhausted_session_aborts_everything() {
    let mut v = verifier(&["entry:", "ret void"]);
    v.check_next("ret void").unwrap_err();
    assert!(v.is_exhausted());
    assert_eq!(v.check("entry:").unwrap_err().kind(), FailureKind::SequenceAborted);
    assert_eq!(v.check_next_pattern("(").unwrap_err().kind(), FailureKind::SequenceAborted);
}

#[test]
fn test_unexpected_line_message() {
    let mut v = verifier(&["entry:", "br label %x", "x:", "ret void"]);
    let err = v.check_next("x:").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r"
    check-next: line 1 of <memory> does not match literal `x:`
      expected: x:
      actual:   entry:
      note: a matching line appears later, at line 3
    ");
}

#[test]
fn test_same_failure_same_message() {
    let run = || {
        let mut v = verifier(&["entry:", "br label %x", "x:", "ret void"]);
        v.check("x:").unwrap();
        v.check("entry:").unwrap_err().to_string()
    };
    assert_eq!(run(), run());
}

// ============================================
// Dumps On Disk
// ============================================

#[test]
fn test_tan_double_stub_call() {
    let dir = tempfile::tempdir().unwrap();
    write_dump(dir.path(), &tan_double(), false, TAN_DUMP);

    let mut checker = Verifier::open(dir.path(), &tan_double())
        .unwrap()
        .with_options(VerifyOptions {
            next_line: NextLineMode::Substring,
        });
    checker
        .check("define hotspotcc double @\"compiler_jeandle_intrinsic_TestTanDouble$TestWrapper_tan_double")
        .unwrap();
    checker.check_next("entry:").unwrap();
    checker.check_next("br label %bci_0").unwrap();
    checker.check("bci_0:").unwrap();
    checker
        .check_next_pattern(r"call double @StubRoutines_dtan")
        .unwrap();
    checker.check_next("ret double").unwrap();
    assert_eq!(checker.remaining(), ["}"]);
}

#[test]
fn test_exact_next_line_rejects_indented_instruction() {
    let dir = tempfile::tempdir().unwrap();
    write_dump(dir.path(), &tan_double(), false, TAN_DUMP);

    let mut checker = Verifier::open(dir.path(), &tan_double()).unwrap();
    checker.check("entry:").unwrap();
    let err = checker.check_next("br label %bci_0").unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnexpectedLine);
    assert_eq!(err.line(), Some(5));
}

#[test]
fn test_optimized_dump_is_separate() {
    let dir = tempfile::tempdir().unwrap();
    write_dump(dir.path(), &tan_double(), false, TAN_DUMP);
    write_dump(
        dir.path(),
        &tan_double(),
        true,
        "define hotspotcc double @f(double %0) {\nentry:\n  %1 = call double inttoptr (i64 140735 to ptr)(double %0)\n  ret double %1\n}\n",
    );

    let resolver = Resolver::new(dir.path()).optimized(true);
    let mut checker = Verifier::open_with(&resolver, &tan_double()).unwrap();
    checker.check("entry:").unwrap();
    let m = checker
        .check_next_pattern(r"call double inttoptr \(i64 (\d+) to ptr\)")
        .unwrap();
    assert_eq!(m.groups, vec![Some("140735".to_string())]);
}

#[test]
fn test_null_check_branch_shape() {
    let dir = tempfile::tempdir().unwrap();
    write_dump(dir.path(), &test_access(), false, NULL_CHECK_DUMP);

    let mut checker = Verifier::open(dir.path(), &test_access())
        .unwrap()
        .with_options(VerifyOptions {
            next_line: NextLineMode::Substring,
        });
    checker
        .check_pattern(
            "br i1 %[0-9]+, label %bci_[0-9]+_null_check_fail, label %bci_[0-9]+_null_check_pass, !make.implicit",
        )
        .unwrap();
    checker.check("bci_1_null_check_pass:").unwrap();
    checker.check_next("getelementptr").unwrap();
    checker.check_next("load i32").unwrap();
    checker.check_next("ret i32").unwrap();
    checker.check("bci_1_null_check_fail:").unwrap();
    checker.check_next("@throw_NullPointerException").unwrap();
    checker.check_next("unreachable").unwrap();
}

#[test]
fn test_missing_dump() {
    let dir = tempfile::tempdir().unwrap();
    let err = Verifier::open(dir.path(), &tan_double()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::DumpNotFound);
    assert!(err.to_string().contains("compiler_jeandle_intrinsic_TestTanDouble$TestWrapper_tan_double_(D)D.ll"));
}

#[test]
fn test_missing_dump_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = Verifier::open(dir.path().join("never-created"), &tan_double()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::DumpNotFound);
}

#[test]
fn test_most_recent_of_repeated_compilations() {
    use std::time::{Duration, SystemTime};

    let dir = tempfile::tempdir().unwrap();
    let unit = CompilationUnitId::new("TestDAbs", "main").param("java.lang.String[]");
    let stem = "TestDAbs_main_([Ljava_lang_String;)V";
    for (n, secs, body) in [(1, 100, "first"), (2, 300, "third"), (3, 200, "second")] {
        let path = dir.path().join(format!("{stem}-{n}.ll"));
        fs::write(&path, body).unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
    }

    let open = |policy| {
        let resolver = Resolver::new(dir.path()).with_policy(policy);
        Verifier::open_with(&resolver, &unit)
    };
    open(DumpPolicy::MostRecent).unwrap().check_next("third").unwrap();
    open(DumpPolicy::FirstWritten).unwrap().check_next("first").unwrap();
    open(DumpPolicy::Ordinal(3)).unwrap().check_next("second").unwrap();
    assert_eq!(
        open(DumpPolicy::Canonical).unwrap_err().kind(),
        FailureKind::DumpNotFound
    );
}

// ============================================
// Check Plans
// ============================================

#[test]
fn test_plan_against_dump() {
    let dir = tempfile::tempdir().unwrap();
    write_dump(dir.path(), &tan_double(), false, TAN_DUMP);

    let plan = CheckPlan::parse(
        r#"
[unit]
owner = "compiler.jeandle.intrinsic.TestTanDouble$TestWrapper"
method = "tan_double"
params = ["D"]
returns = "D"

[options]
next-line = "substring"

[[check]]
check = "define hotspotcc double"
[[check]]
check-next = "entry:"
[[check]]
check-next = "br label %bci_0"
[[check]]
check-pattern = 'call double @StubRoutines_d(\w+)'
"#,
    )
    .unwrap();

    let checks = plan.compile_checks().unwrap();
    let resolver = plan.resolver(dir.path()).unwrap();
    let mut verifier = Verifier::open_with(&resolver, &plan.unit()).unwrap();
    let matches = verifier.run_all(&checks).unwrap();
    assert_eq!(matches.len(), 4);
    assert_eq!(matches[3].groups, vec![Some("tan".to_string())]);

    let summary = verifier.summary();
    assert!(summary.passed);
    assert_eq!(summary.checks_run, 4);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["steps"][1]["directive"], "check-next");
    assert_eq!(json["steps"][1]["line"], 4);
}
