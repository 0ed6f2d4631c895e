//! Remote command plan

use skiff_core::domain::stage::Stage;

/// One command to run on the deployment host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub stage: Stage,
    pub args: Vec<String>,
    /// Non-zero exit is expected when there is nothing to act on
    pub tolerate_failure: bool,
}

impl RemoteCommand {
    fn new(stage: Stage, args: &[&str], tolerate_failure: bool) -> Self {
        Self {
            stage,
            args: args.iter().map(|a| a.to_string()).collect(),
            tolerate_failure,
        }
    }

    /// Renders the command line sent in the exec request
    pub fn render(&self) -> String {
        self.args
            .iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Quotes a single argument for the remote shell
///
/// Arguments made only of safe characters are passed through unchanged.
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));

    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Builds the fixed plan: stop, remove, pull, run
pub fn deployment_plan(
    docker_bin: &str,
    container_name: &str,
    image: &str,
    host_port: u16,
    container_port: u16,
) -> Vec<RemoteCommand> {
    let ports = format!("{}:{}", host_port, container_port);

    vec![
        RemoteCommand::new(Stage::Stop, &[docker_bin, "stop", container_name], true),
        RemoteCommand::new(Stage::Remove, &[docker_bin, "rm", container_name], true),
        RemoteCommand::new(Stage::Pull, &[docker_bin, "pull", image], false),
        RemoteCommand::new(
            Stage::Run,
            &[
                docker_bin,
                "run",
                "-d",
                "--name",
                container_name,
                "-p",
                ports.as_str(),
                image,
            ],
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/myapp-repo:latest";

    #[test]
    fn test_plan_order_and_tolerance() {
        let plan = deployment_plan("docker", "myapp-container", IMAGE, 8000, 8000);

        let stages: Vec<Stage> = plan.iter().map(|c| c.stage).collect();
        assert_eq!(stages, vec![Stage::Stop, Stage::Remove, Stage::Pull, Stage::Run]);

        let tolerant: Vec<bool> = plan.iter().map(|c| c.tolerate_failure).collect();
        assert_eq!(tolerant, vec![true, true, false, false]);
    }

    #[test]
    fn test_plan_renders_expected_commands() {
        let plan = deployment_plan("docker", "myapp-container", IMAGE, 8000, 8000);
        let rendered: Vec<String> = plan.iter().map(RemoteCommand::render).collect();

        assert_eq!(rendered[0], "docker stop myapp-container");
        assert_eq!(rendered[1], "docker rm myapp-container");
        assert_eq!(rendered[2], format!("docker pull {}", IMAGE));
        assert_eq!(
            rendered[3],
            format!("docker run -d --name myapp-container -p 8000:8000 {}", IMAGE)
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("myapp-container"), "myapp-container");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("x; rm -rf /"), "'x; rm -rf /'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_hostile_container_name_stays_one_argument() {
        let plan = deployment_plan("docker", "web$(reboot)", IMAGE, 80, 8000);
        assert_eq!(plan[0].render(), "docker stop 'web$(reboot)'");
        assert_eq!(plan[3].args[6], "80:8000");
    }
}
