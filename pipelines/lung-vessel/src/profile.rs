//! 批处理运行统计.

use lung_berry::prelude::SliceRecord;
use std::time::{Duration, Instant};

/// 批处理计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    #[inline]
    pub fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间综合 (以毫秒为单位).
    #[inline]
    pub fn get_total_ms(&self) -> u64 {
        self.consumed.as_millis() as u64
    }
}

impl Default for AccTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// 批处理数据统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 成功分割的切片个数 (包括没有肺轮廓的切片).
    processed: u64,

    /// 没有任何合格肺轮廓的切片个数.
    empty: u64,

    /// 分割失败的切片个数.
    failed: u64,

    /// 所有切片处理时间之和 (各工作线程的时间累加).
    slice_time: Duration,

    /// 整个任务花费的总自然时间.
    real_time: AccTimer,

    /// 最耗时的一张切片所消耗的时间.
    most: Option<Duration>,

    /// 有定义的血管占比之和.
    ratio_sum: f64,

    /// 有定义的血管占比个数.
    ratios: u64,

    /// 去噪清除的血管像素总数.
    denoised: u64,
}

impl Profile {
    /// 初始化. 同时开始总计时.
    #[inline]
    pub fn new() -> Self {
        Self {
            processed: 0,
            empty: 0,
            failed: 0,
            slice_time: Duration::ZERO,
            real_time: AccTimer::default(),
            most: None,
            ratio_sum: 0.0,
            ratios: 0,
            denoised: 0,
        }
    }

    /// 记录一张切片的处理结果.
    pub fn count_record(&mut self, record: &SliceRecord) {
        self.slice_time += record.elapsed;
        self.most = Some(self.most.map_or(record.elapsed, |d| d.max(record.elapsed)));
        self.denoised += record.denoised as u64;

        match &record.measurement {
            Ok(m) => {
                self.processed += 1;
                if record.lung_contours == 0 {
                    self.empty += 1;
                }
                if let Some(Ok(r)) = m.ratio.map(|r| r.percent()) {
                    self.ratio_sum += r;
                    self.ratios += 1;
                }
            }
            Err(_) => self.failed += 1,
        }
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 获得成功分割的切片个数.
    #[inline]
    pub fn get_processed(&self) -> u64 {
        self.processed
    }

    /// 获得没有肺轮廓的切片个数.
    #[inline]
    pub fn get_empty(&self) -> u64 {
        self.empty
    }

    /// 获得分割失败的切片个数.
    #[inline]
    pub fn get_failed(&self) -> u64 {
        self.failed
    }

    /// 获得去噪清除的血管像素总数.
    #[inline]
    pub fn get_denoised(&self) -> u64 {
        self.denoised
    }

    /// 以毫秒为单位获得所有切片处理时间之和.
    #[inline]
    pub fn get_slice_time_ms(&self) -> u64 {
        self.slice_time.as_millis() as u64
    }

    /// 以毫秒为单位获得总自然时间.
    #[inline]
    pub fn get_real_time_ms(&self) -> u64 {
        self.real_time.get_total_ms()
    }

    /// 以毫秒为单位获得单张切片的平均处理时间.
    pub fn get_avg_slice_time_ms(&self) -> Option<f64> {
        match self.processed + self.failed {
            0 => None,
            n => Some(self.slice_time.as_micros() as f64 / 1000.0 / n as f64),
        }
    }

    /// 获得有定义的血管占比的平均值.
    pub fn get_avg_ratio(&self) -> Option<f64> {
        match self.ratios {
            0 => None,
            n => Some(self.ratio_sum / n as f64),
        }
    }

    /// 获取最耗时的一张切片所消耗的时间. 如果不存在任务, 则返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
