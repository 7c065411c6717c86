/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The analysis environment of one configured target.
//!
//! A fresh [`CachingAnalysisEnvironment`] is created per configured target so
//! that artifacts, actions, and diagnostics of different targets never mix.
//! The rule implementation mutates it, the driver seals it exactly once, and
//! the registered actions are then harvested into the action graph.

use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use blaze_core::exec_path::ExecPath;
use blaze_core::label::ConfiguredTargetLabel;
use blaze_core::root::ArtifactRoot;
use blaze_core::target::Target;
use blaze_events::ErrorSink;
use blaze_events::Reporter;
use gazebo::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::actions::middleman::MiddlemanFactory;
use crate::actions::Action;
use crate::analysis::build_info::RuleContext;
use crate::analysis::build_info::WorkspaceStatusArtifacts;
use crate::analysis::skyframe::BuildInfoKey;
use crate::analysis::skyframe::MissingDepError;
use crate::analysis::skyframe::SkyframeEnv;
use crate::analysis::skyframe::WorkspaceStatusValue;
use crate::analysis::PackageManager;
use crate::artifact::Artifact;
use crate::artifact::ArtifactFactory;
use crate::artifact::ArtifactOwner;
use crate::bin_tools::BinTools;

/// Where an artifact handed out by this environment was declared. Only
/// captured in full when extended sanity checks are on; capturing a stack
/// snapshot per artifact is expensive.
#[derive(Debug)]
pub enum ArtifactOrigin {
    Stack(String),
    Untracked,
}

impl fmt::Display for ArtifactOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stack(stack) => f.write_str(stack),
            Self::Untracked => f.write_str("No origin, run with --extended_sanity_checks"),
        }
    }
}

/// Behavior switches for one analysis environment.
#[derive(Copy, Clone, Dupe, Debug, Default)]
pub struct AnalysisEnvOptions {
    /// Diagnostics go straight to the global reporter and never mark the
    /// target as failed.
    pub is_system_env: bool,
    /// Capture a stack snapshot for every artifact handed out.
    pub extended_sanity_checks: bool,
    /// When false, every registered action is silently dropped. Some
    /// analyses run a target twice, the first pass only collecting
    /// information for the second; registering the first pass's actions
    /// would conflict with the real ones.
    pub allow_register_actions: bool,
}

#[derive(Error, Debug)]
enum AnalysisEnvError {
    #[error(
        "{kind} {label} : These artifacts miss a generating action:\n{orphans}\nThese actions we checked:\n{checked}\n"
    )]
    OrphanArtifacts {
        kind: String,
        label: String,
        orphans: String,
        checked: String,
    },
}

enum EnvState {
    Active(ActiveState),
    Sealed(SealedState),
}

struct ActiveState {
    artifact_factory: Arc<ArtifactFactory>,
    package_manager: Option<Arc<dyn PackageManager>>,
    bin_tools: Option<Arc<BinTools>>,
    /// Present when workspace status was computed eagerly; otherwise build
    /// info goes through the skyframe environment.
    workspace_status: Option<Arc<WorkspaceStatusArtifacts>>,
    skyframe: Option<Arc<dyn SkyframeEnv>>,
    sink: ErrorSink,
    /// Every artifact handed out, with where it was declared. Checked for a
    /// generating action at seal time.
    handed_out: HashMap<Artifact, ArtifactOrigin>,
    /// Actions registered by the target under analysis, in registration
    /// order.
    actions: Vec<Arc<dyn Action>>,
}

struct SealedState {
    actions: Vec<Arc<dyn Action>>,
}

/// The per-configured-target facade through which rule implementations
/// obtain artifacts, register actions, and read build info.
///
/// The environment is a state machine: `active` until [`seal`] succeeds,
/// `sealed` afterwards. Sealing drops everything except the registered
/// actions; any artifact-producing or mutating call on a sealed environment
/// is a programming error and panics.
///
/// [`seal`]: CachingAnalysisEnvironment::seal
pub struct CachingAnalysisEnvironment {
    owner: ConfiguredTargetLabel,
    options: AnalysisEnvOptions,
    state: EnvState,
}

impl CachingAnalysisEnvironment {
    pub fn new(
        artifact_factory: Arc<ArtifactFactory>,
        package_manager: Option<Arc<dyn PackageManager>>,
        owner: ConfiguredTargetLabel,
        workspace_status: Option<Arc<WorkspaceStatusArtifacts>>,
        skyframe: Option<Arc<dyn SkyframeEnv>>,
        bin_tools: Option<Arc<BinTools>>,
        sink: ErrorSink,
        options: AnalysisEnvOptions,
    ) -> Self {
        Self {
            owner,
            options,
            state: EnvState::Active(ActiveState {
                artifact_factory,
                package_manager,
                bin_tools,
                workspace_status,
                skyframe,
                sink,
                handed_out: HashMap::new(),
                actions: Vec::new(),
            }),
        }
    }

    pub fn owner(&self) -> &ConfiguredTargetLabel {
        &self.owner
    }

    fn active(&self) -> &ActiveState {
        match &self.state {
            EnvState::Active(state) => state,
            EnvState::Sealed(_) => panic!(
                "analysis environment for `{}` used after it was sealed",
                self.owner
            ),
        }
    }

    fn active_mut(&mut self) -> &mut ActiveState {
        match &mut self.state {
            EnvState::Active(state) => state,
            EnvState::Sealed(_) => panic!(
                "analysis environment for `{}` used after it was sealed",
                self.owner
            ),
        }
    }

    /// Records an artifact in the handed-out map. A re-request never
    /// overwrites the origin recorded for the first one.
    fn track(&mut self, artifact: Artifact) -> Artifact {
        let extended = self.options.extended_sanity_checks;
        let state = self.active_mut();
        state
            .handed_out
            .entry(artifact.dupe())
            .or_insert_with(|| {
                if extended {
                    ArtifactOrigin::Stack(Backtrace::force_capture().to_string())
                } else {
                    ArtifactOrigin::Untracked
                }
            });
        artifact
    }

    pub fn get_derived_artifact(&mut self, path: &ExecPath, root: &ArtifactRoot) -> Artifact {
        let artifact = {
            let state = self.active();
            state.artifact_factory.derived_artifact(
                path,
                root,
                &ArtifactOwner::Target(self.owner.dupe()),
            )
        };
        self.track(artifact)
    }

    pub fn get_fileset_artifact(&mut self, path: &ExecPath, root: &ArtifactRoot) -> Artifact {
        let artifact = {
            let state = self.active();
            state.artifact_factory.fileset_artifact(
                path,
                root,
                &ArtifactOwner::Target(self.owner.dupe()),
            )
        };
        self.track(artifact)
    }

    /// Passed through to the factory without tracking: provenance of these
    /// artifacts is managed by their consumers.
    pub fn get_special_metadata_artifact(
        &self,
        path: &ExecPath,
        root: &ArtifactRoot,
        force_constant_metadata: bool,
        force_digest_metadata: bool,
    ) -> Artifact {
        self.active().artifact_factory.special_metadata_artifact(
            path,
            root,
            &ArtifactOwner::Target(self.owner.dupe()),
            force_constant_metadata,
            force_digest_metadata,
        )
    }

    pub fn get_embedded_tool_artifact(&self, embedded_path: &ExecPath) -> anyhow::Result<Artifact> {
        let state = self.active();
        let bin_tools = state
            .bin_tools
            .as_ref()
            .context("no embedded tools were supplied to this analysis environment")?;
        bin_tools.embedded_artifact(embedded_path, &state.artifact_factory)
    }

    pub fn register_action(&mut self, action: Arc<dyn Action>) {
        let allow = self.options.allow_register_actions;
        let state = self.active_mut();
        if allow {
            state.actions.push(action);
        }
    }

    /// The earliest registered action producing `artifact`, if any. A linear
    /// scan; only used for diagnostics.
    pub fn get_local_generating_action(&self, artifact: &Artifact) -> Option<Arc<dyn Action>> {
        assert!(
            self.options.allow_register_actions,
            "generating actions are not tracked when action registration is disabled"
        );
        self.registered_actions()
            .iter()
            .find(|action| action.outputs().contains(artifact))
            .duped()
    }

    /// The registered actions in registration order. Remains readable after
    /// seal; this is what the driver harvests.
    pub fn registered_actions(&self) -> &[Arc<dyn Action>] {
        match &self.state {
            EnvState::Active(state) => &state.actions,
            EnvState::Sealed(state) => &state.actions,
        }
    }

    /// The sink rule logic reports its diagnostics to.
    pub fn reporter(&self) -> &dyn Reporter {
        self.active().sink.as_reporter()
    }

    pub fn package_manager(&self) -> Option<&Arc<dyn PackageManager>> {
        self.active().package_manager.as_ref()
    }

    pub fn has_errors(&self) -> bool {
        // The system analysis environment never has errors.
        if self.options.is_system_env {
            return false;
        }
        self.active().sink.has_errors()
    }

    /// A factory for aggregating middlemen, borrowing this environment for
    /// its whole lifetime.
    pub fn middleman_factory(&mut self) -> MiddlemanFactory<'_> {
        let _ = self.active();
        MiddlemanFactory::new(self)
    }

    fn workspace_status_value(&self) -> Result<WorkspaceStatusValue, MissingDepError> {
        let state = self.active();
        let skyframe = state.skyframe.as_ref().expect(
            "analysis environment constructed with neither a workspace status provider nor a skyframe environment",
        );
        skyframe
            .workspace_status()
            .ok_or_else(|| MissingDepError::new("WORKSPACE_STATUS"))
    }

    /// The stable workspace-status artifact.
    pub fn get_build_info_artifact(&self) -> Result<Artifact, MissingDepError> {
        match &self.active().workspace_status {
            Some(status) => Ok(status.stable_status()),
            None => Ok(self.workspace_status_value()?.stable_artifact()),
        }
    }

    /// The volatile workspace-status artifact (changelist and friends).
    pub fn get_build_changelist_artifact(&self) -> Result<Artifact, MissingDepError> {
        match &self.active().workspace_status {
            Some(status) => Ok(status.volatile_status()),
            None => Ok(self.workspace_status_value()?.volatile_artifact()),
        }
    }

    /// The build-info artifacts for `key` in the rule's configuration:
    /// stamped when the rule has stamping enabled, redacted otherwise.
    pub fn get_build_info(
        &self,
        rule_context: &RuleContext,
        key: &BuildInfoKey,
    ) -> Result<Vec<Artifact>, MissingDepError> {
        let stamp = rule_context.stamping_enabled();
        let state = self.active();
        match &state.workspace_status {
            Some(status) => Ok(status.build_info(key, rule_context.configuration(), stamp)),
            None => {
                let skyframe = state.skyframe.as_ref().expect(
                    "analysis environment constructed with neither a workspace status provider nor a skyframe environment",
                );
                let collection = skyframe
                    .build_info_collection(key, rule_context.configuration())
                    .ok_or_else(|| {
                        MissingDepError::new(format!(
                            "BUILD_INFO_COLLECTION:{}:{}",
                            key,
                            rule_context.configuration()
                        ))
                    })?;
                let artifacts = if stamp {
                    collection.stamped_build_info()
                } else {
                    collection.redacted_build_info()
                };
                Ok(artifacts.map(Dupe::dupe))
            }
        }
    }

    /// Seals this environment: verifies that every derived artifact handed
    /// out has a generating action, then drops everything except the
    /// registered actions. On a failed check the environment stays active.
    pub fn seal(&mut self, target: &Target) -> anyhow::Result<()> {
        if self.options.allow_register_actions && !self.has_errors() {
            self.verify_generated_artifacts_have_actions(target)?;
        }
        let state = self.active_mut();
        let actions = std::mem::take(&mut state.actions);
        debug!(owner = %self.owner, actions = actions.len(), "sealed analysis environment");
        self.state = EnvState::Sealed(SealedState { actions });
        Ok(())
    }

    /// The structural sanity check at the heart of sealing: every non-source
    /// artifact handed out must be the output of some registered action.
    fn verify_generated_artifacts_have_actions(&self, target: &Target) -> anyhow::Result<()> {
        let state = self.active();
        // Collect into a set first; scanning actions per artifact degrades
        // badly under large --runs_per_test.
        let mut with_actions: HashSet<&Artifact> = HashSet::new();
        for action in &state.actions {
            with_actions.extend(action.outputs().iter());
        }
        let mut orphans = Vec::new();
        for (artifact, origin) in &state.handed_out {
            if !artifact.is_source() && !with_actions.contains(artifact) {
                orphans.push(format!("{}\n{}", artifact.exec_path(), origin));
            }
        }
        if orphans.is_empty() {
            return Ok(());
        }
        let checked = state.actions.map(|action| short_description(&**action));
        Err(AnalysisEnvError::OrphanArtifacts {
            kind: target.target_kind().to_owned(),
            label: target.label().to_string(),
            orphans: orphans.join("\n"),
            checked: checked.join("\n"),
        }
        .into())
    }
}

fn short_description(action: &dyn Action) -> String {
    let mut out = format!("{} {}", action.type_name(), action.mnemonic());
    for output in action.outputs() {
        out.push_str("\n    ");
        out.push_str(output.exec_path().as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use blaze_core::configuration::Configuration;
    use blaze_core::exec_path::ExecPathBuf;
    use blaze_core::label::Label;
    use blaze_events::StderrReporter;

    use super::*;
    use crate::actions::testings::SimpleAction;
    use crate::analysis::skyframe::BuildInfoCollection;

    fn owner() -> ConfiguredTargetLabel {
        ConfiguredTargetLabel::new(Label::parse("//x:y").unwrap(), Configuration::testing_new())
    }

    fn target() -> Target {
        Target::new(Label::parse("//x:y").unwrap(), "sh_binary rule")
    }

    fn bin_root() -> ArtifactRoot {
        ArtifactRoot::derived(ExecPathBuf::new("blaze-out/k8-fastbuild/bin").unwrap())
    }

    fn test_env(options: AnalysisEnvOptions) -> CachingAnalysisEnvironment {
        CachingAnalysisEnvironment::new(
            Arc::new(ArtifactFactory::new()),
            None,
            owner(),
            None,
            None,
            None,
            ErrorSink::stored(),
            options,
        )
    }

    fn default_options() -> AnalysisEnvOptions {
        AnalysisEnvOptions {
            is_system_env: false,
            extended_sanity_checks: false,
            allow_register_actions: true,
        }
    }

    #[test]
    fn test_orphan_artifact_fails_seal() {
        let mut env = test_env(default_options());
        env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
        let err = env.seal(&target()).unwrap_err().to_string();
        assert!(err.contains("//x:y"), "{}", err);
        assert!(err.contains("out/foo.o"), "{}", err);
        assert!(
            err.contains("These artifacts miss a generating action"),
            "{}",
            err
        );
    }

    #[test]
    fn test_seal_succeeds_with_generating_action() {
        let mut env = test_env(default_options());
        let artifact = env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
        env.register_action(Arc::new(SimpleAction::new(
            vec!["touch".to_owned()],
            [artifact],
            "Touch",
        )));
        env.seal(&target()).unwrap();
        assert_eq!(1, env.registered_actions().len());
    }

    #[test]
    fn test_orphan_diagnostic_lists_checked_actions() {
        let mut env = test_env(default_options());
        let covered = env.get_derived_artifact(ExecPath::new("out/a.o").unwrap(), &bin_root());
        env.get_derived_artifact(ExecPath::new("out/b.o").unwrap(), &bin_root());
        env.register_action(Arc::new(SimpleAction::new(
            vec!["cc".to_owned()],
            [covered],
            "CppCompile",
        )));
        let err = env.seal(&target()).unwrap_err().to_string();
        assert!(err.contains("out/b.o"), "{}", err);
        assert!(err.contains("These actions we checked:"), "{}", err);
        assert!(err.contains("CppCompile"), "{}", err);
        assert!(err.contains("out/a.o"), "{}", err);
    }

    #[test]
    #[should_panic(expected = "used after it was sealed")]
    fn test_use_after_seal_panics() {
        let mut env = test_env(default_options());
        env.seal(&target()).unwrap();
        env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
    }

    #[test]
    fn test_failed_seal_leaves_env_active() {
        let mut env = test_env(default_options());
        let artifact = env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
        assert!(env.seal(&target()).is_err());
        // Still active: registering the missing action makes the next seal
        // pass.
        env.register_action(Arc::new(SimpleAction::new(vec![], [artifact], "Touch")));
        env.seal(&target()).unwrap();
    }

    #[test]
    fn test_registration_disabled_drops_actions() {
        let mut env = test_env(AnalysisEnvOptions {
            allow_register_actions: false,
            ..default_options()
        });
        let artifact = env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
        env.register_action(Arc::new(SimpleAction::new(vec![], [artifact], "Touch")));
        assert!(env.registered_actions().is_empty());
        // The orphan check is skipped when registration is disabled.
        env.seal(&target()).unwrap();
    }

    #[test]
    #[should_panic(expected = "not tracked when action registration is disabled")]
    fn test_local_generating_action_requires_registration() {
        let mut env = test_env(AnalysisEnvOptions {
            allow_register_actions: false,
            ..default_options()
        });
        let artifact = env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
        env.get_local_generating_action(&artifact);
    }

    #[test]
    fn test_local_generating_action_returns_earliest() {
        let mut env = test_env(default_options());
        let a = env.get_derived_artifact(ExecPath::new("out/a.o").unwrap(), &bin_root());
        let b = env.get_derived_artifact(ExecPath::new("out/b.o").unwrap(), &bin_root());
        env.register_action(Arc::new(SimpleAction::new(
            vec!["first".to_owned()],
            [a.dupe()],
            "First",
        )));
        env.register_action(Arc::new(SimpleAction::new(
            vec!["second".to_owned()],
            [b.dupe()],
            "Second",
        )));
        let generating = env.get_local_generating_action(&a).unwrap();
        assert_eq!("First", generating.mnemonic());
        assert!(env.get_local_generating_action(&b).is_some());
        let other = env.get_derived_artifact(ExecPath::new("out/c.o").unwrap(), &bin_root());
        assert!(env.get_local_generating_action(&other).is_none());
    }

    #[test]
    fn test_rule_errors_suppress_orphan_check() {
        let mut env = test_env(default_options());
        env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
        env.reporter().error("rule failed before registering actions");
        assert!(env.has_errors());
        env.seal(&target()).unwrap();
    }

    #[test]
    fn test_system_env_never_has_errors() {
        // Even a buffered error does not count for the system environment.
        let env = CachingAnalysisEnvironment::new(
            Arc::new(ArtifactFactory::new()),
            None,
            owner(),
            None,
            None,
            None,
            ErrorSink::stored(),
            AnalysisEnvOptions {
                is_system_env: true,
                ..default_options()
            },
        );
        env.reporter().error("boom");
        assert!(!env.has_errors());
    }

    #[test]
    fn test_handed_out_artifacts_carry_env_owner() {
        let mut env = test_env(default_options());
        let artifact = env.get_derived_artifact(ExecPath::new("out/foo.o").unwrap(), &bin_root());
        assert_eq!(&ArtifactOwner::Target(owner()), artifact.owner());
    }

    #[test]
    fn test_rerequest_preserves_origin() {
        let mut env = test_env(AnalysisEnvOptions {
            extended_sanity_checks: true,
            ..default_options()
        });
        let path = ExecPath::new("out/foo.o").unwrap();
        let first = env.get_derived_artifact(path, &bin_root());
        let second = env.get_derived_artifact(path, &bin_root());
        assert_eq!(first, second);
        match &env.state {
            EnvState::Active(state) => {
                assert_eq!(1, state.handed_out.len());
                assert!(matches!(
                    state.handed_out.get(&first).unwrap(),
                    ArtifactOrigin::Stack(_)
                ));
            }
            EnvState::Sealed(_) => unreachable!(),
        }
    }

    #[test]
    fn test_special_metadata_artifact_is_untracked() {
        let mut env = test_env(default_options());
        env.get_special_metadata_artifact(
            ExecPath::new("out/volatile-status.txt").unwrap(),
            &bin_root(),
            true,
            false,
        );
        // Untracked artifacts never trip the orphan check.
        env.seal(&target()).unwrap();
    }

    #[test]
    fn test_middleman_survives_seal() {
        let mut env = test_env(default_options());
        let input = env.get_derived_artifact(ExecPath::new("out/a.o").unwrap(), &bin_root());
        env.register_action(Arc::new(SimpleAction::new(vec![], [input.dupe()], "Gen")));
        let middleman = env
            .middleman_factory()
            .create_aggregating_middleman("runfiles", vec![input], &bin_root())
            .unwrap();
        env.seal(&target()).unwrap();
        assert_eq!(2, env.registered_actions().len());
        assert!(env.registered_actions()[1].outputs().contains(&middleman));
    }

    #[derive(Debug, Default)]
    struct FakeSkyframe {
        status: Mutex<Option<WorkspaceStatusValue>>,
        collection: Mutex<Option<BuildInfoCollection>>,
    }

    impl SkyframeEnv for FakeSkyframe {
        fn workspace_status(&self) -> Option<WorkspaceStatusValue> {
            self.status.lock().unwrap().clone()
        }

        fn build_info_collection(
            &self,
            _key: &BuildInfoKey,
            _configuration: &Configuration,
        ) -> Option<BuildInfoCollection> {
            self.collection.lock().unwrap().clone()
        }
    }

    fn status_artifacts(factory: &ArtifactFactory) -> (Artifact, Artifact) {
        let root = ArtifactRoot::derived(ExecPathBuf::new("blaze-out").unwrap());
        let stable = factory.source_artifact(ExecPath::new("stable-status.txt").unwrap(), &root);
        let volatile =
            factory.source_artifact(ExecPath::new("volatile-status.txt").unwrap(), &root);
        (stable, volatile)
    }

    #[test]
    fn test_missing_workspace_status_restarts() {
        let factory = Arc::new(ArtifactFactory::new());
        let skyframe = Arc::new(FakeSkyframe::default());
        let mut env = CachingAnalysisEnvironment::new(
            factory.dupe(),
            None,
            owner(),
            None,
            Some(skyframe.dupe() as Arc<dyn SkyframeEnv>),
            None,
            ErrorSink::stored(),
            default_options(),
        );
        assert_eq!(
            Err(MissingDepError::new("WORKSPACE_STATUS")),
            env.get_build_info_artifact()
        );
        // Once the dependency is computed a retry sees it; the miss left no
        // state behind.
        let (stable, volatile) = status_artifacts(&factory);
        *skyframe.status.lock().unwrap() =
            Some(WorkspaceStatusValue::new(stable.dupe(), volatile.dupe()));
        assert_eq!(Ok(stable), env.get_build_info_artifact());
        assert_eq!(Ok(volatile), env.get_build_changelist_artifact());
        env.seal(&target()).unwrap();
    }

    #[test]
    fn test_build_info_stamping_via_skyframe() {
        let factory = Arc::new(ArtifactFactory::new());
        let (stamped, redacted) = status_artifacts(&factory);
        let skyframe = Arc::new(FakeSkyframe::default());
        *skyframe.collection.lock().unwrap() = Some(BuildInfoCollection::new(
            vec![stamped.dupe()],
            vec![redacted.dupe()],
        ));
        let env = CachingAnalysisEnvironment::new(
            factory,
            None,
            owner(),
            None,
            Some(skyframe as Arc<dyn SkyframeEnv>),
            None,
            ErrorSink::stored(),
            default_options(),
        );
        let key = BuildInfoKey::new("cpp");
        let stamping = RuleContext::new(Configuration::testing_new(), true);
        let reproducible = RuleContext::new(Configuration::testing_new(), false);
        assert_eq!(vec![stamped], env.get_build_info(&stamping, &key).unwrap());
        assert_eq!(
            vec![redacted],
            env.get_build_info(&reproducible, &key).unwrap()
        );
    }

    #[test]
    fn test_build_info_prefers_eager_provider() {
        let factory = Arc::new(ArtifactFactory::new());
        let (stable, volatile) = status_artifacts(&factory);
        let mut status = WorkspaceStatusArtifacts::new(stable.dupe(), volatile.dupe());
        let key = BuildInfoKey::new("cpp");
        status.add_collection(
            key.dupe(),
            Configuration::testing_new(),
            BuildInfoCollection::new(vec![stable.dupe()], vec![]),
        );
        let env = CachingAnalysisEnvironment::new(
            factory,
            None,
            owner(),
            Some(Arc::new(status)),
            None,
            None,
            ErrorSink::stored(),
            default_options(),
        );
        assert_eq!(Ok(stable.dupe()), env.get_build_info_artifact());
        assert_eq!(Ok(volatile), env.get_build_changelist_artifact());
        let stamping = RuleContext::new(Configuration::testing_new(), true);
        assert_eq!(vec![stable], env.get_build_info(&stamping, &key).unwrap());
    }

    #[test]
    fn test_embedded_tool_artifact() {
        let bin_tools = BinTools::new(
            ArtifactRoot::derived(ExecPathBuf::new("_bin").unwrap()),
            [ExecPathBuf::new("build-runfiles").unwrap()],
        );
        let mut env = CachingAnalysisEnvironment::new(
            Arc::new(ArtifactFactory::new()),
            None,
            owner(),
            None,
            None,
            Some(Arc::new(bin_tools)),
            ErrorSink::stored(),
            default_options(),
        );
        let tool = env
            .get_embedded_tool_artifact(ExecPath::new("build-runfiles").unwrap())
            .unwrap();
        assert!(tool.is_source());
        // Embedded tools are not tracked, so sealing needs no action for
        // them.
        env.seal(&target()).unwrap();
    }

    #[test]
    fn test_stderr_reporter_sink_for_system_env() {
        let env = CachingAnalysisEnvironment::new(
            Arc::new(ArtifactFactory::new()),
            None,
            owner(),
            None,
            None,
            None,
            ErrorSink::Global(Arc::new(StderrReporter)),
            AnalysisEnvOptions {
                is_system_env: true,
                ..default_options()
            },
        );
        assert!(!env.has_errors());
    }
}
