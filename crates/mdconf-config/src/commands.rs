//! The managed-domain directive table and the walker that applies a parsed
//! configuration tree to a [`ConfigPass`].

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::directive::{CmdContext, ContextCheck, Directive};
use crate::error::{ConfigError, ConfigResult};
use crate::pass::{ConfigPass, ServerId};
use crate::scope::{ScopeProps, collect_members, parse_section_header};
use crate::types::DomainGroup;
use crate::values::{
    parse_http_url, parse_key_spec, parse_on_off, parse_renew_mode, parse_renew_window,
    parse_require_https, parse_transitive,
};

/// Argument shapes, enforced before a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Args {
    /// Exactly one argument.
    Take1,
    /// One or two arguments.
    Take12,
    /// Any number of arguments.
    TakeArgv,
    /// The unsplit argument text.
    Raw,
}

type Handler = fn(&mut Cmd<'_>) -> ConfigResult<()>;

/// One entry of the directive table.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    /// Directive name; sections keep their leading `<`.
    pub name: &'static str,
    /// Accepted arguments.
    pub args: Args,
    /// One-line description.
    pub help: &'static str,
    handler: Handler,
}

/// State handed to a directive handler.
pub(crate) struct Cmd<'a> {
    pass: &'a mut ConfigPass,
    server: ServerId,
    directive: &'a Directive,
    parents: &'a mut Vec<String>,
}

impl Cmd<'_> {
    fn context(&self) -> CmdContext<'_> {
        CmdContext::new(&self.directive.name, self.parents.as_slice())
    }

    /// Allowed anywhere inside an MD section, otherwise global only.
    fn check_global_or_section(&self) -> ConfigResult<()> {
        let ctx = self.context();
        if ctx.inside_md_section() {
            return Ok(());
        }
        ctx.check(ContextCheck::GlobalOnly)
    }

    fn check_global(&self) -> ConfigResult<()> {
        self.context().check(ContextCheck::GlobalOnly)
    }

    fn value(&self) -> &str {
        self.directive.args.first().map_or("", String::as_str)
    }

    fn props(&mut self) -> ConfigResult<&mut ScopeProps> {
        Ok(&mut self.pass.server_mut(self.server)?.props)
    }

    fn section(&mut self) -> ConfigResult<&mut DomainGroup> {
        if !self.context().inside_md_section() {
            return Err(self.context().not_in_section());
        }
        let not_in_section = self.context().not_in_section();
        self.pass
            .server_mut(self.server)?
            .section_mut()
            .ok_or(not_in_section)
    }
}

const COMMANDS: &[Command] = &[
    Command {
        name: "MDCertificateAuthority",
        args: Args::Take1,
        help: "URL of CA issuing the certificates",
        handler: set_ca,
    },
    Command {
        name: "MDCertificateAgreement",
        args: Args::Take1,
        help: "either 'accepted' or the URL of CA Terms-of-Service agreement you accept",
        handler: set_agreement,
    },
    Command {
        name: "MDCAChallenges",
        args: Args::TakeArgv,
        help: "A list of challenge types to be used.",
        handler: add_challenges,
    },
    Command {
        name: "MDCertificateProtocol",
        args: Args::Take1,
        help: "Protocol used to obtain/renew certificates",
        handler: set_ca_proto,
    },
    Command {
        name: "MDDriveMode",
        args: Args::Take1,
        help: "deprecated, older name for MDRenewMode",
        handler: set_renew_mode,
    },
    Command {
        name: "MDRenewMode",
        args: Args::Take1,
        help: "Controls how renewal of Managed Domain certificates shall be handled.",
        handler: set_renew_mode,
    },
    Command {
        name: "MDomain",
        args: Args::TakeArgv,
        help: "A group of server names with one certificate",
        handler: declare_domain,
    },
    Command {
        name: "<MDomainSet",
        args: Args::Raw,
        help: "Container for a managed domain with common settings and certificate.",
        handler: md_section,
    },
    Command {
        name: "<MDomain",
        args: Args::Raw,
        help: "Short form for <MDomainSet> container.",
        handler: md_section,
    },
    Command {
        name: "MDMember",
        args: Args::TakeArgv,
        help: "Define domain name(s) part of the Managed Domain. Use 'auto' or 'manual' to \
               enable/disable auto adding names from virtual hosts.",
        handler: add_members,
    },
    Command {
        name: "MDMembers",
        args: Args::TakeArgv,
        help: "Define domain name(s) part of the Managed Domain. Use 'auto' or 'manual' to \
               enable/disable auto adding names from virtual hosts.",
        handler: add_members,
    },
    Command {
        name: "MDMustStaple",
        args: Args::Take1,
        help: "Enable/Disable the Must-Staple flag for new certificates.",
        handler: set_must_staple,
    },
    Command {
        name: "MDPortMap",
        args: Args::Take12,
        help: "Declare the mapped ports 80 and 443 on the local server. E.g. 80:8000 to \
               indicate that the server port 8000 is reachable as port 80 from the internet. \
               Use 80:- to indicate that port 80 is not reachable from the outside.",
        handler: set_port_map,
    },
    Command {
        name: "MDPrivateKeys",
        args: Args::TakeArgv,
        help: "set the type and parameters for private key generation",
        handler: set_private_keys,
    },
    Command {
        name: "MDHttpProxy",
        args: Args::Take1,
        help: "URL of a HTTP(S) proxy to use for outgoing connections",
        handler: set_proxy,
    },
    Command {
        name: "MDStoreDir",
        args: Args::Take1,
        help: "the directory for file system storage of managed domain data.",
        handler: set_store_dir,
    },
    Command {
        name: "MDRenewWindow",
        args: Args::Take1,
        help: "Time length for renewal before certificate expires (defaults to days)",
        handler: set_renew_window,
    },
    Command {
        name: "MDRequireHttps",
        args: Args::Take1,
        help: "Redirect non-secure requests to the https: equivalent.",
        handler: set_require_https,
    },
    Command {
        name: "MDNotifyCmd",
        args: Args::Raw,
        help: "set the command and optional arguments to run when signup/renew of domain \
               is complete.",
        handler: set_notify_cmd,
    },
    Command {
        name: "MDBaseServer",
        args: Args::Take1,
        help: "allow managing of base server outside virtual hosts.",
        handler: set_base_server,
    },
    Command {
        name: "MDChallengeDns01",
        args: Args::Raw,
        help: "set the command for setup/teardown of dns-01 challenges",
        handler: set_dns01_cmd,
    },
    Command {
        name: "MDCertificateFile",
        args: Args::Take1,
        help: "set the static certificate (chain) file to use for this domain.",
        handler: set_cert_file,
    },
    Command {
        name: "MDCertificateKeyFile",
        args: Args::Take1,
        help: "set the static private key file to use for this domain.",
        handler: set_key_file,
    },
    Command {
        name: "MDServerStatus",
        args: Args::Take1,
        help: "On to see Managed Domains in server-status.",
        handler: set_server_status,
    },
    Command {
        name: "MDCertificateStatus",
        args: Args::Take1,
        help: "On to see Managed Domain expose /.httpd/certificate-status.",
        handler: set_certificate_status,
    },
];

/// The full directive table.
#[must_use]
pub fn commands() -> &'static [Command] {
    COMMANDS
}

/// Find a directive by name (case-insensitive).
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Command> {
    COMMANDS
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Applies parsed directives to a configuration pass in declaration order.
///
/// The first failing directive aborts the walk; its error carries the
/// directive's file and line.
#[derive(Debug)]
pub struct Dispatcher<'p> {
    pass: &'p mut ConfigPass,
}

impl<'p> Dispatcher<'p> {
    /// Dispatch into `pass`.
    pub fn new(pass: &'p mut ConfigPass) -> Self {
        Self { pass }
    }

    /// Walk `tree` starting at the main server scope.
    ///
    /// # Errors
    ///
    /// Returns the first handler, arity or context error encountered.
    pub fn run(&mut self, tree: &[Directive]) -> ConfigResult<()> {
        let main = self.pass.main_server();
        walk(self.pass, main, tree, &mut Vec::new())
    }
}

fn walk(
    pass: &mut ConfigPass,
    server: ServerId,
    tree: &[Directive],
    parents: &mut Vec<String>,
) -> ConfigResult<()> {
    for directive in tree {
        if let Some(command) = lookup(&directive.name) {
            check_arity(command, directive)
                .and_then(|()| {
                    let mut cmd = Cmd {
                        pass: &mut *pass,
                        server,
                        directive,
                        parents: &mut *parents,
                    };
                    (command.handler)(&mut cmd)
                })
                .map_err(|e| with_provenance(e, directive))?;
        } else if directive.is("<VirtualHost") {
            let name = server_name(directive);
            let vhost = pass.add_server(&name);
            parents.push(directive.name.clone());
            let outcome = walk(pass, vhost, &directive.children, parents);
            parents.pop();
            outcome?;
        } else if directive.is_section() {
            parents.push(directive.name.clone());
            let outcome = walk(pass, server, &directive.children, parents);
            parents.pop();
            outcome?;
        } else if directive.is("ServerName") || directive.is("ServerAlias") {
            debug!(directive = %directive.name, line = directive.line, "host directive");
        } else {
            warn!(
                directive = %directive.name,
                file = %directive.file,
                line = directive.line,
                "ignoring unknown directive"
            );
        }
    }
    Ok(())
}

fn server_name(vhost: &Directive) -> String {
    vhost
        .children
        .iter()
        .find(|child| child.is("ServerName"))
        .and_then(|child| child.args.first())
        .or_else(|| vhost.args.first())
        .map_or_else(|| "vhost".to_owned(), Clone::clone)
}

fn check_arity(command: &Command, directive: &Directive) -> ConfigResult<()> {
    let count = directive.args.len();
    let expected = match command.args {
        Args::Take1 if count != 1 => "takes one argument",
        Args::Take12 if !(1..=2).contains(&count) => "takes one or two arguments",
        _ => return Ok(()),
    };
    Err(ConfigError::format(format!(
        "{} {expected}, {}",
        command.name, command.help
    )))
}

fn with_provenance(err: ConfigError, directive: &Directive) -> ConfigError {
    match err {
        ConfigError::Directive { .. } | ConfigError::Syntax { .. } => err,
        other => ConfigError::Directive {
            directive: directive.name.clone(),
            file: directive.file.clone(),
            line: directive.line,
            source: Box::new(other),
        },
    }
}

// ---------------------------------------------------------------------------
// Sections and domain declarations
// ---------------------------------------------------------------------------

fn md_section(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global()?;
    let directive = cmd.directive;
    let (names, transitive) = parse_section_header(&directive.raw_args)?;
    let mut group = DomainGroup::new(names)?.with_definition(&directive.file, directive.line);
    group.transitive = transitive;

    let server = cmd.server;
    cmd.parents.push(directive.name.clone());
    let parents = &mut *cmd.parents;
    let outcome = cmd
        .pass
        .with_section(server, group, |pass| walk(pass, server, &directive.children, parents));
    cmd.parents.pop();
    outcome
}

fn declare_domain(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.context().check(ContextCheck::NotInDirLocFile)?;
    let (names, transitive) = collect_members(&cmd.directive.args);
    let mut md =
        DomainGroup::new(names)?.with_definition(&cmd.directive.file, cmd.directive.line);
    md.transitive = transitive;
    cmd.pass.register_domain_group(md);
    Ok(())
}

fn add_members(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    let directive = cmd.directive;
    if !cmd.context().inside_md_section() {
        // Outside a section only a lone auto/manual is accepted.
        if let [value] = directive.args.as_slice() {
            let Some(transitive) = parse_transitive(value) else {
                return Err(ConfigError::format("unknown value, use \"auto|manual\""));
            };
            cmd.props()?.transitive = Some(transitive);
            return Ok(());
        }
        return Err(cmd.context().not_in_section());
    }

    let (names, transitive) = collect_members(&directive.args);
    let md = cmd.section()?;
    for name in &names {
        md.add_domain(name);
    }
    if let Some(transitive) = transitive {
        cmd.props()?.transitive = Some(transitive);
    }
    Ok(())
}

fn set_cert_file(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    let path = PathBuf::from(cmd.value());
    cmd.section()?.cert_file = Some(path);
    Ok(())
}

fn set_key_file(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    let path = PathBuf::from(cmd.value());
    cmd.section()?.pkey_file = Some(path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Scope settings
// ---------------------------------------------------------------------------

fn set_ca(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let value = cmd.value().to_owned();
    cmd.props()?.ca_url = Some(value);
    Ok(())
}

fn set_agreement(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let value = cmd.value().to_owned();
    cmd.props()?.ca_agreement = Some(value);
    Ok(())
}

fn set_ca_proto(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let value = cmd.value().to_owned();
    cmd.props()?.ca_proto = Some(value);
    Ok(())
}

fn add_challenges(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let types = cmd.directive.args.clone();
    cmd.props()?
        .ca_challenges
        .get_or_insert_with(Vec::new)
        .extend(types);
    Ok(())
}

fn set_renew_mode(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    let mode = parse_renew_mode(cmd.value())?;
    cmd.check_global_or_section()?;
    cmd.props()?.renew_mode = Some(mode);
    Ok(())
}

fn set_must_staple(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let value = parse_on_off(cmd.value())?;
    cmd.props()?.must_staple = Some(value);
    Ok(())
}

fn set_require_https(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let value = parse_require_https(cmd.value())?;
    cmd.props()?.require_https = Some(value);
    Ok(())
}

fn set_renew_window(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let timing = parse_renew_window(cmd.value())?.timing();
    cmd.props()?.renew_timing = Some(timing);
    Ok(())
}

fn set_private_keys(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let spec = parse_key_spec(&cmd.directive.args)?;
    cmd.props()?.pkey_spec = Some(spec);
    Ok(())
}

// ---------------------------------------------------------------------------
// Global settings
// ---------------------------------------------------------------------------

fn set_port_map(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global()?;
    let directive = cmd.directive;
    let global = cmd.pass.global_mut();
    for value in &directive.args {
        global.set_port_map(value)?;
    }
    Ok(())
}

fn set_proxy(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global()?;
    let url = parse_http_url(cmd.value())?;
    cmd.pass.global_mut().proxy_url = Some(url);
    Ok(())
}

fn set_store_dir(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global()?;
    let dir = cmd.value().to_owned();
    cmd.pass.global_mut().base_dir = Some(dir);
    Ok(())
}

fn set_notify_cmd(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global()?;
    cmd.pass.global_mut().notify_cmd = Some(cmd.directive.raw_args.clone());
    Ok(())
}

fn set_dns01_cmd(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global()?;
    cmd.pass.global_mut().set_dns01_cmd(&cmd.directive.raw_args);
    Ok(())
}

fn set_base_server(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global()?;
    let value = parse_on_off(cmd.value())?;
    cmd.pass.global_mut().manage_base_server = value;
    Ok(())
}

fn set_server_status(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let value = parse_on_off(cmd.value())?;
    cmd.pass.global_mut().server_status_enabled = value;
    Ok(())
}

fn set_certificate_status(cmd: &mut Cmd<'_>) -> ConfigResult<()> {
    cmd.check_global_or_section()?;
    let value = parse_on_off(cmd.value())?;
    cmd.pass.global_mut().certificate_status_enabled = value;
    Ok(())
}
