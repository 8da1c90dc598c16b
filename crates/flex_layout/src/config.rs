use crate::{NodeId, style::Style};
use once_cell::sync::Lazy;
use std::{fmt, sync::Arc};
use strum::{Display, EnumCount};

/// Opt-in behavior that is not part of the stable algorithm yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumCount)]
#[strum(serialize_all = "kebab-case")]
pub enum ExperimentalFeature {
    /// Recompute a child's flex basis on every pass instead of reusing it while the child
    /// stays clean.
    WebFlexBasis,
}

/// Severity of a diagnostic emitted by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
    Fatal,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error | LogLevel::Fatal => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Verbose => log::Level::Trace,
        }
    }
}

/// Receives every diagnostic emitted for nodes using a config.
pub type Logger = Arc<dyn Fn(Option<NodeId>, LogLevel, &str) + Send + Sync>;

/// Adjusts the style of each node produced while cloning a subtree.
///
/// Called with the source node, the owner the clone is being attached to and the clone's
/// index within that owner.
pub type CloneNodeFn = Arc<dyn Fn(NodeId, Option<NodeId>, usize, &mut Style) + Send + Sync>;

static DEFAULT_CONFIG: Lazy<Arc<Config>> = Lazy::new(|| Arc::new(Config::new()));

/// Tunables shared by the nodes of a tree.
///
/// A config is an immutable value once it is attached to nodes. Build it with the `with_*`
/// methods and share it through an [`Arc`].
#[derive(Clone)]
pub struct Config {
    use_web_defaults: bool,
    use_legacy_stretch_behaviour: bool,
    should_diff_layout_without_legacy_stretch_behaviour: bool,
    print_tree: bool,
    point_scale_factor: f32,
    experimental_features: [bool; ExperimentalFeature::COUNT],
    logger: Option<Logger>,
    clone_node: Option<CloneNodeFn>,
}

impl Config {
    pub fn new() -> Self {
        Config {
            use_web_defaults: false,
            use_legacy_stretch_behaviour: false,
            should_diff_layout_without_legacy_stretch_behaviour: false,
            print_tree: false,
            point_scale_factor: 1.0,
            experimental_features: [false; ExperimentalFeature::COUNT],
            logger: None,
            clone_node: None,
        }
    }

    /// A config whose nodes start from [`Style::web`].
    pub fn web() -> Self {
        Config::new().with_web_defaults(true)
    }

    /// The immutable process-wide default.
    pub fn default_shared() -> Arc<Config> {
        DEFAULT_CONFIG.clone()
    }

    pub fn with_web_defaults(mut self, enabled: bool) -> Self {
        self.use_web_defaults = enabled;
        self
    }

    /// Restores the stretch behavior of older releases, where a container sized by its
    /// content still stretched to the available space along its main axis.
    pub fn with_legacy_stretch_behaviour(mut self, enabled: bool) -> Self {
        self.use_legacy_stretch_behaviour = enabled;
        self
    }

    pub fn with_diff_layout_without_legacy_stretch_behaviour(mut self, enabled: bool) -> Self {
        self.should_diff_layout_without_legacy_stretch_behaviour = enabled;
        self
    }

    /// Logs the laid out tree after every layout pass.
    pub fn with_print_tree(mut self, enabled: bool) -> Self {
        self.print_tree = enabled;
        self
    }

    /// Sets the number of physical pixels per point. Layout results are rounded to this grid;
    /// zero disables rounding.
    pub fn with_point_scale_factor(mut self, factor: f32) -> Self {
        if factor.is_nan() || factor < 0.0 {
            log::warn!("ignoring invalid point scale factor {factor}, rounding is disabled");
            self.point_scale_factor = 0.0;
        } else {
            self.point_scale_factor = factor;
        }
        self
    }

    pub fn with_experimental_feature(
        mut self,
        feature: ExperimentalFeature,
        enabled: bool,
    ) -> Self {
        self.experimental_features[feature as usize] = enabled;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_clone_node(mut self, clone_node: CloneNodeFn) -> Self {
        self.clone_node = Some(clone_node);
        self
    }

    pub fn use_web_defaults(&self) -> bool {
        self.use_web_defaults
    }

    pub fn use_legacy_stretch_behaviour(&self) -> bool {
        self.use_legacy_stretch_behaviour
    }

    pub fn should_diff_layout_without_legacy_stretch_behaviour(&self) -> bool {
        self.should_diff_layout_without_legacy_stretch_behaviour
    }

    pub fn print_tree(&self) -> bool {
        self.print_tree
    }

    pub fn point_scale_factor(&self) -> f32 {
        self.point_scale_factor
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> bool {
        self.experimental_features[feature as usize]
    }

    pub(crate) fn clone_node_hook(&self) -> Option<&CloneNodeFn> {
        self.clone_node.as_ref()
    }

    /// The style new nodes start from.
    pub fn default_style(&self) -> Style {
        if self.use_web_defaults {
            Style::web()
        } else {
            Style::default()
        }
    }

    /// Routes a diagnostic to the configured logger, or to the `log` facade when none is set.
    pub fn log(&self, node: Option<NodeId>, level: LogLevel, message: &str) {
        match &self.logger {
            Some(logger) => logger(node, level, message),
            None => {
                let level = log::Level::from(level);
                match node {
                    Some(node) => log::log!(level, "{node:?}: {message}"),
                    None => log::log!(level, "{message}"),
                }
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("use_web_defaults", &self.use_web_defaults)
            .field(
                "use_legacy_stretch_behaviour",
                &self.use_legacy_stretch_behaviour,
            )
            .field(
                "should_diff_layout_without_legacy_stretch_behaviour",
                &self.should_diff_layout_without_legacy_stretch_behaviour,
            )
            .field("print_tree", &self.print_tree)
            .field("point_scale_factor", &self.point_scale_factor)
            .field("experimental_features", &self.experimental_features)
            .field("logger", &self.logger.is_some())
            .field("clone_node", &self.clone_node.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FlexDirection;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(LogLevel, String)>>);

    impl Recorder {
        fn logger(self: &Arc<Self>) -> Logger {
            let this = self.clone();
            Arc::new(move |_: Option<NodeId>, level: LogLevel, message: &str| {
                if let Ok(mut entries) = this.0.lock() {
                    entries.push((level, message.to_string()));
                }
            })
        }
    }

    #[test]
    fn test_default_style_follows_web_defaults() {
        assert_eq!(
            Config::new().default_style().flex_direction,
            FlexDirection::Column
        );
        assert_eq!(Config::web().default_style().flex_direction, FlexDirection::Row);
    }

    #[test]
    fn test_invalid_point_scale_factor_disables_rounding() {
        assert_eq!(Config::new().point_scale_factor(), 1.0);
        assert_eq!(
            Config::new().with_point_scale_factor(-2.0).point_scale_factor(),
            0.0
        );
    }

    #[test]
    fn test_experimental_features_toggle_independently() {
        let config =
            Config::new().with_experimental_feature(ExperimentalFeature::WebFlexBasis, true);
        assert!(config.is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis));
        assert!(!Config::new().is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis));
    }

    #[test]
    fn test_custom_logger_receives_messages() {
        let recorder = Arc::new(Recorder::default());
        let config = Config::new().with_logger(recorder.logger());
        config.log(None, LogLevel::Warn, "careful");

        let entries = recorder.0.lock().unwrap();
        assert_eq!(entries.as_slice(), &[(LogLevel::Warn, "careful".to_string())]);
    }
}
