use critmon_common::report::ReportKind;

pub struct ChannelRoute {
    pub kinds: Vec<ReportKind>,
    pub channel_index: usize,
}

impl ChannelRoute {
    /// Route that accepts every report kind.
    pub fn all(channel_index: usize) -> Self {
        Self {
            kinds: vec![ReportKind::Summary, ReportKind::Violation],
            channel_index,
        }
    }

    pub fn should_send(&self, kind: ReportKind) -> bool {
        self.kinds.contains(&kind)
    }
}
