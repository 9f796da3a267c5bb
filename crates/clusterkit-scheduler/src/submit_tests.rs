use super::*;
use crate::backend::BackendChoice;

#[test]
fn test_slurm_defaults() {
    let spec = JobSpec::new("python main.py", "job");
    assert_eq!(
        SlurmSubmit.build_submit(&spec).unwrap(),
        "echo '#!/bin/bash\npython main.py' | sbatch --job-name=job \
         --time=24:00:00 --mem=4000"
    );
}

#[test]
fn test_sge_defaults() {
    let spec = JobSpec::new("python main.py", "job");
    assert_eq!(
        SgeSubmit.build_submit(&spec).unwrap(),
        "echo '#!/bin/bash\npython main.py' | qsub -N \"job\" -l h_rt=24:00:00 \
         -l h_vmem=4000M"
    );
}

#[test]
fn test_slurm_log_directory() {
    let spec = JobSpec::new("python main.py", "job").with_log_directory("/path/test");
    assert_eq!(
        SlurmSubmit.build_submit(&spec).unwrap(),
        "echo '#!/bin/bash\npython main.py' | sbatch --job-name=job \
         --time=24:00:00 --mem=4000 -o /path/test/job.%j.txt"
    );
}

#[test]
fn test_sge_log_directory() {
    let spec = JobSpec::new("python main.py", "job").with_log_directory("/path/test");
    assert_eq!(
        SgeSubmit.build_submit(&spec).unwrap(),
        "echo '#!/bin/bash\npython main.py' | qsub -N \"job\" -l h_rt=24:00:00 \
         -l h_vmem=4000M -j y -o '/path/test/$JOB_NAME.$JOB_ID.txt'"
    );
}

#[test]
fn test_sge_extra_mail_flags_append_in_order() {
    let spec = JobSpec::new("python main.py", "job")
        .with_extra_flag("-M test@test.com")
        .with_extra_flag("-m beas");
    assert_eq!(
        SgeSubmit.build_submit(&spec).unwrap(),
        "echo '#!/bin/bash\npython main.py' | qsub -N \"job\" -l h_rt=24:00:00 \
         -l h_vmem=4000M -M test@test.com -m beas"
    );
}

#[test]
fn test_slurm_concrete_scenario() {
    let spec = JobSpec::new("srun hostname", "job-name")
        .with_time("10:00")
        .with_memory_mb(1000)
        .with_backend(BackendChoice::Slurm);
    let cmd = SlurmSubmit.build_submit(&spec).unwrap();
    assert_eq!(
        cmd,
        "echo '#!/bin/bash\nsrun hostname' | sbatch --job-name=job-name \
         --time=10:00 --mem=1000"
    );
}

#[test]
fn test_multiline_command_preserved_verbatim() {
    let spec = JobSpec::new("srun hostname\nsleep 60", "job-name")
        .with_time("10:00")
        .with_memory_mb(1000);
    let cmd = SlurmSubmit.build_submit(&spec).unwrap();
    assert!(cmd.starts_with("echo '#!/bin/bash\nsrun hostname\nsleep 60' | sbatch"));
}

#[test]
fn test_appending_free_text_composes() {
    let spec = JobSpec::new("srun hostname", "job-name")
        .with_time("10:00")
        .with_memory_mb(1000);
    let mut cmd = SlurmSubmit.build_submit(&spec).unwrap();
    cmd += " --quiet";
    assert!(cmd.contains("--job-name=job-name --time=10:00 --mem=1000"));
    assert!(cmd.ends_with("--mem=1000 --quiet"));
}

#[test]
fn test_extra_flags_follow_recognized_flags() {
    let spec = JobSpec::new("python main.py", "job")
        .with_log_directory("/logs")
        .with_extra_flag("--partition=gpu");
    let cmd = SlurmSubmit.build_submit(&spec).unwrap();
    assert!(cmd.ends_with("-o /logs/job.%j.txt --partition=gpu"));
}

#[test]
fn test_single_quote_in_command_is_escaped() {
    let spec = JobSpec::new("echo 'ok'", "job");
    let cmd = SlurmSubmit.build_submit(&spec).unwrap();
    assert!(cmd.starts_with("echo '#!/bin/bash\necho '\\''ok'\\''' | sbatch"));
}

#[test]
fn test_custom_interpreter_line() {
    let spec = JobSpec::new("print('hi')", "job").with_interpreter("#!/usr/bin/env python");
    let cmd = SgeSubmit.build_submit(&spec).unwrap();
    assert!(cmd.starts_with("echo '#!/usr/bin/env python\n"));
}

#[test]
fn test_empty_job_name_rejected() {
    let spec = JobSpec::new("python main.py", "");
    assert!(matches!(
        SlurmSubmit.build_submit(&spec),
        Err(SchedulerError::InvalidSpec(_))
    ));
}

#[test]
fn test_empty_command_rejected() {
    let spec = JobSpec::new("", "job");
    assert!(matches!(
        SgeSubmit.build_submit(&spec),
        Err(SchedulerError::InvalidSpec(_))
    ));
}

#[test]
fn test_job_name_needing_escaping_rejected() {
    for name in ["two words", "quo'te", "dollar$name"] {
        let spec = JobSpec::new("python main.py", name);
        assert!(
            matches!(
                SlurmSubmit.build_submit(&spec),
                Err(SchedulerError::InvalidSpec(_))
            ),
            "name {name:?} should be rejected"
        );
    }
}

#[test]
fn test_unicode_job_name_accepted() {
    let spec = JobSpec::new("sleep 600", "test-unicode-sl\u{e9}\u{e9}py-job");
    let cmd = SlurmSubmit.build_submit(&spec).unwrap();
    assert!(cmd.contains("--job-name=test-unicode-sl\u{e9}\u{e9}py-job"));
}

#[test]
fn test_builder_for_matches_backend() {
    assert_eq!(builder_for(Backend::Slurm).backend(), Backend::Slurm);
    assert_eq!(builder_for(Backend::Sge).backend(), Backend::Sge);
}

#[test]
fn test_submit_command_resolves_backend() {
    struct SgeOnly;
    impl Environment for SgeOnly {
        fn var(&self, _: &str) -> Option<String> {
            None
        }
        fn has_tool(&self, name: &str) -> bool {
            name == "qmod"
        }
    }

    let spec = JobSpec::new("python main.py", "job");
    let cmd = submit_command(&spec, &SgeOnly).unwrap();
    assert!(cmd.contains("| qsub "));
}
