use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use tracing::debug;

/// Data that flows through the pipeline
#[derive(Clone)]
pub struct PipelineData {
    /// The image data (can be grayscale or color)
    pub image: DynamicImage,

    /// Reference to the untouched input image (shared efficiently via Arc)
    pub original: Arc<DynamicImage>,
}

impl PipelineData {
    /// Create PipelineData from an input that is already shared
    pub fn from_shared(original: Arc<DynamicImage>) -> Self {
        Self {
            image: original.as_ref().clone(),
            original,
        }
    }

    /// Replace the working image, keeping the link to the input
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            original: self.original.clone(),
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in verbose output)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    /// Run the pipeline sequentially on an input image
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_shared(Arc::new(input))
    }

    /// Run the pipeline on an input the caller keeps a handle to
    pub fn run_shared(&self, input: Arc<DynamicImage>) -> Result<Vec<PipelineData>> {
        self.save_debug_input(&input)?;
        self.run_steps(vec![PipelineData::from_shared(input)], self.steps.len())
    }

    /// Run the pipeline but stop at an intermediate step (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        let input = Arc::new(input);
        self.save_debug_input(&input)?;
        self.run_steps(vec![PipelineData::from_shared(input)], num_steps)
    }

    /// Run the whole pipeline and keep every step's output, in step order
    pub fn run_stages(&self, input: DynamicImage) -> Result<Vec<Vec<PipelineData>>> {
        let input = Arc::new(input);
        self.save_debug_input(&input)?;

        let mut stages = Vec::with_capacity(self.steps.len());
        let mut data = vec![PipelineData::from_shared(input)];
        for step_idx in 0..self.steps.len() {
            data = self.run_step(step_idx, data)?;
            stages.push(data.clone());
        }
        Ok(stages)
    }

    fn run_steps(&self, mut data: Vec<PipelineData>, num_steps: usize) -> Result<Vec<PipelineData>> {
        for step_idx in 0..num_steps.min(self.steps.len()) {
            data = self.run_step(step_idx, data)?;
        }
        Ok(data)
    }

    fn run_step(&self, step_idx: usize, data: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        let step = &self.steps[step_idx];
        if self.context.verbose {
            debug!(step = step.name(), items = data.len(), "running pipeline step");
        }

        let data = step.process(data, &self.context)?;
        self.save_debug_step(step_idx, step.name(), &data)?;

        if self.context.verbose {
            debug!(step = step.name(), items = data.len(), "pipeline step finished");
        }
        Ok(data)
    }

    fn enabled_debug(&self) -> Option<&DebugConfig> {
        self.context.debug.as_ref().filter(|config| config.enabled)
    }

    fn save_debug_input(&self, input: &DynamicImage) -> Result<()> {
        let Some(debug_config) = self.enabled_debug() else {
            return Ok(());
        };

        let input_dir = debug_config.output_dir.join("00_input");
        std::fs::create_dir_all(&input_dir)?;
        input.save(input_dir.join("01.png"))
            .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
        debug!("saved 00_input/01.png");
        Ok(())
    }

    fn save_debug_step(&self, step_idx: usize, step_name: &str, data: &[PipelineData]) -> Result<()> {
        let Some(debug_config) = self.enabled_debug() else {
            return Ok(());
        };

        let step_dir_name = format!("{:02}_{}", step_idx + 1,
            step_name.to_lowercase().replace(' ', "_"));
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        for (idx, item) in data.iter().enumerate() {
            let output_path = step_dir.join(format!("{:02}.png", idx + 1));
            item.image.save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        }

        debug!(count = data.len(), dir = %step_dir_name, "saved debug images");
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
