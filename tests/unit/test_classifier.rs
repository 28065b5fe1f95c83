//! Unit tests for the stream classifier: command families, prompt
//! confidence, long-running detection, readiness and critical-error scans.

use remoterun::classifier::{
    classify, critical_error_match, is_long_running, ready_match, CommandFamily,
    ServerFamily, AUTO_RESPONSE_CONFIDENCE,
};

#[test]
fn test_family_resolution_order() {
    // sudo wins over anything later in the table
    assert_eq!(
        CommandFamily::resolve("sudo mysql -u root"),
        CommandFamily::Sudo
    );
    assert_eq!(
        CommandFamily::resolve("ssh deploy@host uptime"),
        CommandFamily::Ssh
    );
    assert_eq!(CommandFamily::resolve("mysql -u app db"), CommandFamily::Mysql);
    assert_eq!(CommandFamily::resolve("psql -h db"), CommandFamily::Psql);
    assert_eq!(CommandFamily::resolve("ls -la"), CommandFamily::Generic);
}

#[test]
fn test_family_resolution_is_case_insensitive() {
    assert_eq!(CommandFamily::resolve("SUDO apt update"), CommandFamily::Sudo);
    assert_eq!(CommandFamily::resolve("MySQL -u root"), CommandFamily::Mysql);
}

#[test]
fn test_sudo_prompt_high_confidence() {
    let c = classify("[sudo] password for deploy: ", "sudo apt update");
    assert!(c.is_sudo_prompt);
    assert!(c.is_password_prompt);
    assert!(c.confidence >= AUTO_RESPONSE_CONFIDENCE);
    assert!(c.should_auto_respond());
}

#[test]
fn test_ssh_password_prompt() {
    let c = classify("deploy@web-01's password: ", "ssh deploy@web-01");
    assert!(c.is_password_prompt);
    assert!(!c.is_sudo_prompt);
    assert!(c.should_auto_respond());
}

#[test]
fn test_non_sudo_command_never_classifies_sudo() {
    // The generic fallback table carries no sudo rows, so a sudo-looking
    // chunk from a non-sudo command cannot produce a sudo classification.
    let c = classify("[sudo] password for deploy: ", "ls -la");
    assert!(!c.is_sudo_prompt);
}

#[test]
fn test_plain_output_is_not_a_prompt() {
    let c = classify("total 48\ndrwxr-xr-x 6 deploy\n", "ls -la");
    assert!(!c.is_auth_prompt());
    assert!(!c.should_auto_respond());
    assert_eq!(c.confidence, 0);
}

#[test]
fn test_low_confidence_does_not_auto_respond() {
    // "password" buried mid-sentence scores below the threshold
    let c = classify("set the password in config.yml later\n", "cat notes.txt");
    assert!(!c.should_auto_respond());
}

#[test]
fn test_long_running_detection() {
    assert!(is_long_running("npm run dev"));
    assert!(is_long_running("yarn start"));
    assert!(is_long_running("python3 -m http.server 8080"));
    assert!(is_long_running("python manage.py runserver"));
    assert!(is_long_running("tail -f /var/log/syslog"));
    assert!(is_long_running("docker compose up"));
    assert!(is_long_running("ssh -L 8080:localhost:80 jump"));
    assert!(is_long_running("rails s"));

    assert!(!is_long_running("npm install"));
    assert!(!is_long_running("git pull"));
    assert!(!is_long_running("ls -la"));
    assert!(!is_long_running("cat tail.txt"));
}

#[test]
fn test_docker_detached_is_not_long_running() {
    assert!(is_long_running("docker compose up"));
    assert!(!is_long_running("docker compose up -d"));
    assert!(!is_long_running("docker-compose up -d --build"));
}

#[test]
fn test_server_family_resolution() {
    assert_eq!(ServerFamily::resolve("npm run dev"), ServerFamily::Node);
    assert_eq!(
        ServerFamily::resolve("python manage.py runserver"),
        ServerFamily::Python
    );
    assert_eq!(ServerFamily::resolve("rails server"), ServerFamily::Ruby);
    assert_eq!(ServerFamily::resolve("docker compose up"), ServerFamily::Docker);
    assert_eq!(ServerFamily::resolve("tail -f app.log"), ServerFamily::Tail);
}

#[test]
fn test_ready_match_node() {
    assert!(ready_match("  Local:   http://localhost:3000\n", "npm run dev").is_some());
    assert!(ready_match("compiling modules...\n", "npm run dev").is_none());
}

#[test]
fn test_ready_match_python() {
    assert!(ready_match(
        "Starting development server at http://127.0.0.1:8000/\n",
        "python manage.py runserver"
    )
    .is_some());
}

#[test]
fn test_tail_is_ready_on_any_output() {
    assert!(ready_match("anything at all", "tail -f /var/log/syslog").is_some());
}

#[test]
fn test_critical_error_signatures() {
    assert!(critical_error_match("bash: frobnicate: command not found\n").is_some());
    assert!(critical_error_match("rm: cannot remove 'x': Permission denied\n").is_some());
    assert!(critical_error_match("cat: nope.txt: No such file or directory\n").is_some());
    assert!(critical_error_match("everything is fine\n").is_none());
}

#[test]
fn test_family_resolved_from_command_not_chunk() {
    // The command decides which table scans the chunk
    let from_mysql = classify("Enter password: ", "mysql -u root");
    assert!(from_mysql.is_password_prompt);

    let from_generic = classify("Enter password: ", "some-tool --init");
    // Generic table still knows plain password prompts, at lower confidence
    assert!(from_generic.confidence <= from_mysql.confidence);
}
