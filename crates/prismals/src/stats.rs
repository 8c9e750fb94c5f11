//! Frame statistics.

use prismals_core::AudicleReport;
use prismals_rendering::RenderStats;

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Delta time fed to the tick, in seconds.
    pub delta_time: f32,
    /// Input event instances appended to the active world.
    pub events_emitted: usize,
    /// True if UAV events moved the camera.
    pub camera_moved: bool,
    /// Result of the audicle pass.
    pub audicles: AudicleReport,
    /// Audio sources traced this tick.
    pub audio_sources: usize,
    /// Peak amplitude drained from the audio ring, if a visualizer exists.
    pub audio_peak: Option<f32>,
    /// True if the active world holds a tesseract.
    pub tesseract_active: bool,
    /// What reached the GPU backend.
    pub render: RenderStats,
    /// Time spent in the update steps before rendering, in microseconds.
    pub logic_us: u64,
    /// Time spent in sky, camera and render steps, in microseconds.
    pub render_us: u64,
    /// Total tick time in microseconds.
    pub total_us: u64,
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of logic times.
    pub logic_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Input events over all frames.
    pub events_total: u64,
    /// Payload children spawned over all frames.
    pub spawned_total: u64,
    /// Audicles retired over all frames.
    pub retired_total: u64,
    /// Most draw calls in a single frame.
    pub max_draw_calls: u32,
    /// Instances drawn by the last frame.
    pub last_instances: u32,
    /// Stars drawn by the last frame.
    pub last_stars: u32,
    /// Buffer growths over all frames.
    pub reallocations_total: u64,
    /// Loudest visualizer peak seen.
    pub peak_amplitude: f32,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            logic_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            events_total: 0,
            spawned_total: 0,
            retired_total: 0,
            max_draw_calls: 0,
            last_instances: 0,
            last_stars: 0,
            reallocations_total: 0,
            peak_amplitude: 0.0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: &FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.logic_us_sum += stats.logic_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        self.events_total += stats.events_emitted as u64;
        self.spawned_total += stats.audicles.spawned as u64;
        self.retired_total += stats.audicles.retired as u64;
        self.max_draw_calls = self.max_draw_calls.max(stats.render.draw_calls);
        self.last_instances = stats.render.instances;
        self.last_stars = stats.render.stars;
        self.reallocations_total += u64::from(stats.render.reallocations);
        if let Some(peak) = stats.audio_peak {
            self.peak_amplitude = self.peak_amplitude.max(peak);
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Prints a summary of the statistics.
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ───────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!("│ Average Frame:      {:.3} ms", self.avg_frame_ms());
        if self.frames_recorded > 0 {
            let frames = self.frames_recorded as f64;
            println!("│ Min Frame:          {:.3} ms", self.min_frame_us as f64 / 1000.0);
            println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
            println!("│ Logic:              {:.3} ms", self.logic_us_sum as f64 / frames / 1000.0);
            println!("│ Render:             {:.3} ms", self.render_us_sum as f64 / frames / 1000.0);
        }
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ WORLD ────────────────────────────────────────────────────────┐");
        println!("│ Input Events:       {}", self.events_total);
        println!("│ Spawned:            {}", self.spawned_total);
        println!("│ Retired:            {}", self.retired_total);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ RENDER ───────────────────────────────────────────────────────┐");
        println!("│ Instances:          {}", self.last_instances);
        println!("│ Stars:              {}", self.last_stars);
        println!("│ Max Draw Calls:     {}", self.max_draw_calls);
        println!("│ Reallocations:      {}", self.reallocations_total);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ AUDIO ────────────────────────────────────────────────────────┐");
        println!("│ Peak Amplitude:     {:.4}", self.peak_amplitude);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_counts() {
        let mut acc = FrameStatsAccumulator::new();
        let mut stats = FrameStats {
            total_us: 100,
            events_emitted: 2,
            audio_peak: Some(0.3),
            ..FrameStats::default()
        };
        stats.audicles.spawned = 6;
        stats.audicles.retired = 1;
        stats.render.draw_calls = 4;
        acc.record(&stats);

        stats.total_us = 300;
        stats.audicles = AudicleReport::default();
        stats.render.draw_calls = 2;
        stats.audio_peak = None;
        acc.record(&stats);

        assert_eq!(acc.frames_recorded, 2);
        assert_eq!(acc.min_frame_us, 100);
        assert_eq!(acc.max_frame_us, 300);
        assert!((acc.avg_frame_ms() - 0.2).abs() < 1e-9);
        assert_eq!(acc.events_total, 4);
        assert_eq!(acc.spawned_total, 6);
        assert_eq!(acc.retired_total, 1);
        assert_eq!(acc.max_draw_calls, 4);
        assert!((acc.peak_amplitude - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_average() {
        assert_eq!(FrameStatsAccumulator::new().avg_frame_ms(), 0.0);
    }
}
