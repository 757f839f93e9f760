use clap::ValueEnum;
use jobfiles_resolver::EngineConfig;
use jobfiles_tree::TreeOptions;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum TreeView {
    Detail,
    Sidebar,
}

impl TreeView {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            TreeView::Detail => "detail",
            TreeView::Sidebar => "sidebar",
        }
    }

    pub(crate) fn options(self, config: &EngineConfig, depth: Option<usize>) -> TreeOptions {
        let options = match self {
            TreeView::Detail => TreeOptions::unbounded(),
            TreeView::Sidebar => config.sidebar_options(),
        };
        match depth {
            Some(depth) => options.with_max_depth(Some(depth)),
            None => options,
        }
    }
}
