/// The four linear steps of the creation wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    #[default]
    UploadVideo,
    UploadAudio,
    NameTwin,
    Generate,
}

impl WizardStep {
    /// Position shown to the user, starting at 1
    pub fn number(&self) -> u8 {
        match self {
            Self::UploadVideo => 1,
            Self::UploadAudio => 2,
            Self::NameTwin => 3,
            Self::Generate => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::all().into_iter().find(|s| s.number() == n)
    }

    pub fn title(&self) -> &str {
        match self {
            Self::UploadVideo => "Upload Video",
            Self::UploadAudio => "Upload Audio",
            Self::NameTwin => "Name Your Twin",
            Self::Generate => "Generate Clone",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::UploadVideo => "Record or upload a 30-second video",
            Self::UploadAudio => "Provide a clear voice sample",
            Self::NameTwin => "Give your digital twin a name",
            Self::Generate => "Create your AI avatar",
        }
    }

    pub fn subtitle(&self) -> &str {
        match self {
            Self::UploadVideo => "Well-lit, front-facing video with neutral background",
            Self::UploadAudio => "30-second clip of you speaking clearly",
            Self::NameTwin => "Add a name and optional description",
            Self::Generate => "AI processing and model generation",
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?)
    }

    pub fn all() -> [WizardStep; 4] {
        [Self::UploadVideo, Self::UploadAudio, Self::NameTwin, Self::Generate]
    }
}
