#[cfg(test)]
mod tests {
    use assert_cmd::cargo::CargoError;

    pub fn run_simulator() -> Result<assert_cmd::Command, CargoError> {
        assert_cmd::Command::cargo_bin("virus-sim")
    }

    fn summary(args: &[&str]) -> serde_json::Value {
        let output = run_simulator().unwrap().args(args).output().unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        serde_json::from_slice(&output.stdout).unwrap()
    }

    #[test]
    fn prints_summary_json() {
        let json = summary(&[
            "--config",
            "tests/data/small_outbreak.json",
            "--random-seed",
            "7",
            "--max-days",
            "20",
        ]);
        assert_eq!(json["virus"], "test_flu");
        assert_eq!(json["initial_population"], 300);
        assert_eq!(json["initial_infected"], 5);
        assert!(json["day"].as_u64().unwrap() <= 20);
    }

    #[test]
    fn same_seed_same_output() {
        let args = [
            "--config",
            "tests/data/small_outbreak.json",
            "--random-seed",
            "123",
            "--max-days",
            "40",
        ];
        assert_eq!(summary(&args), summary(&args));
    }

    #[test]
    fn unknown_config_key_fails() {
        run_simulator()
            .unwrap()
            .args(["--config", "tests/data/unknown_key.json"])
            .assert()
            .failure();
    }

    #[test]
    fn too_many_seed_infections_fails() {
        let output = run_simulator()
            .unwrap()
            .args(["--config", "tests/data/too_many_seeds.json"])
            .output()
            .unwrap();
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("invalid configuration"));
    }

    #[test]
    fn missing_population_size_fails_before_running() {
        let output = run_simulator().unwrap().output().unwrap();
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("invalid configuration"), "{stderr}");
        assert!(stderr.contains("population size is required"), "{stderr}");
    }

    #[test]
    fn log_level_writes_to_stderr() {
        let output = run_simulator()
            .unwrap()
            .args([
                "--config",
                "tests/data/small_outbreak.json",
                "--max-days",
                "3",
                "--log-level",
                "info",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("virus_sim::population"), "{stderr}");
        assert!(stderr.contains("set up population of 300"), "{stderr}");
    }
}
