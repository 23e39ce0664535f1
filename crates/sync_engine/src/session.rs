//! Viewer session: one PairCache shared by exactly one leader and one follower.

use std::sync::Arc;

use contracts::{Eye, EyeRole, FrameSource};
use tracing::debug;

use crate::cache::PairCache;
use crate::emitter::{EmitterConfig, PacedEmitter};

/// Left/right emitters of one viewer session
///
/// Each session owns its own cache, so concurrent viewers never share timestamps
/// or pairs. The left eye leads.
pub struct StereoSession<S> {
    id: u64,
    cache: Arc<PairCache>,
    left: PacedEmitter<S>,
    right: PacedEmitter<S>,
}

impl<S> StereoSession<S>
where
    S: FrameSource + Send + Sync,
{
    pub fn new(id: u64, source: Arc<S>, config: EmitterConfig) -> Self {
        let cache = Arc::new(PairCache::new());
        let left = PacedEmitter::new(
            id,
            Eye::Left,
            EyeRole::Leader,
            Arc::clone(&source),
            Arc::clone(&cache),
            config.clone(),
        );
        let right = PacedEmitter::new(
            id,
            Eye::Right,
            EyeRole::Follower,
            source,
            Arc::clone(&cache),
            config,
        );
        debug!(session = id, "stereo session created");
        Self {
            id,
            cache,
            left,
            right,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Session cache (read access for diagnostics)
    pub fn cache(&self) -> &Arc<PairCache> {
        &self.cache
    }

    /// Split into `(left, right)` tracks, one per transport track
    pub fn into_tracks(self) -> (PacedEmitter<S>, PacedEmitter<S>) {
        (self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_source::MockStereoSource;

    #[tokio::test(start_paused = true)]
    async fn test_sessions_do_not_share_state() {
        let source = Arc::new(MockStereoSource::counting(8, 8));
        let config = EmitterConfig::from_stream(&Default::default(), 8, 8);

        let a = StereoSession::new(1, source.clone(), config.clone());
        let b = StereoSession::new(2, source.clone(), config);
        let cache_a = a.cache().clone();
        let cache_b = b.cache().clone();

        let (mut a_left, _) = a.into_tracks();
        let (_, mut b_right) = b.into_tracks();

        a_left.next_frame().await.unwrap();
        a_left.next_frame().await.unwrap();
        let frame = b_right.next_frame().await.unwrap();

        assert_eq!(cache_a.pts().await, 6000);
        assert_eq!(cache_b.pts().await, 0);
        assert!(frame.placeholder);
    }

    #[test]
    fn test_roles() {
        let source = Arc::new(MockStereoSource::counting(8, 8));
        let session = StereoSession::new(7, source, EmitterConfig::default());
        assert_eq!(session.id(), 7);
        let (left, right) = session.into_tracks();
        assert_eq!(left.role(), EyeRole::Leader);
        assert_eq!(right.role(), EyeRole::Follower);
        assert_eq!(right.eye(), Eye::Right);
    }
}
