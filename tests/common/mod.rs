use assert_cmd::Command;

pub fn diary_cmd() -> Command {
    let mut cmd = Command::cargo_bin("diary").unwrap();
    cmd.env_remove("DIARY_ROOT");
    cmd.env_remove("DIARY_REMOTE");
    cmd.env_remove("DIARY_LOG");
    cmd.env_remove("EDITOR");
    cmd.env_remove("VISUAL");
    cmd
}
