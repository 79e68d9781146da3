//! 串行节流器 - 基础设施层
//!
//! "一次只跑一步，每步结束后固定等待" 的调度原语。
//! `run` 需要 `&mut self`，同一个 pacer 上不可能有两个请求同时在途。

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// 串行节流器
///
/// 职责：
/// - 保证步骤严格串行
/// - 每步成功返回后等待固定时长（不在第一步之前等待）
/// - 步骤失败时立即返回，不再等待
#[derive(Debug)]
pub struct SerialPacer {
    delay: Duration,
    steps: usize,
}

impl SerialPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, steps: 0 }
    }

    /// 执行一步
    pub async fn run<F, Fut, T, E>(&mut self, step: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let output = step().await?;
        self.steps += 1;
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        Ok(output)
    }

    /// 已成功完成的步数
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_delay_after_each_step_not_before() {
        let mut pacer = SerialPacer::new(Duration::from_millis(300));
        let start = Instant::now();
        let mut started_at = Vec::new();

        for i in 0..3 {
            let out: Result<(usize, Duration), ()> = pacer
                .run(|| async move { Ok((i, start.elapsed())) })
                .await;
            let (step, at) = out.unwrap();
            assert_eq!(step, i);
            started_at.push(at);
        }

        assert_eq!(
            started_at,
            vec![
                Duration::ZERO,
                Duration::from_millis(300),
                Duration::from_millis(600)
            ]
        );
        assert_eq!(pacer.steps(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_returns_without_waiting() {
        let mut pacer = SerialPacer::new(Duration::from_secs(5));
        let start = Instant::now();

        let out: Result<(), &str> = pacer.run(|| async { Err("boom") }).await;

        assert_eq!(out, Err("boom"));
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(pacer.steps(), 0);
    }
}
