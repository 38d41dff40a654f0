//! Screen sequencing: loading, letter, question, celebration.
//!
//! [`ScreenFlow`] is a pure state machine. The DOM layer feeds it UI events and
//! performs the returned [`Effect`]s in order. Events that do not apply to the
//! current screen, or repeat an already handled one, produce no effects.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Letter,
    Question,
    Celebration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    /// Loading delay elapsed.
    LoadingElapsed,
    /// "Open letter" activated.
    OpenLetter,
    /// Letter reveal animation ended, or its reduced-motion fallback fired.
    RevealFinished,
    /// "Continue" activated.
    Continue,
    /// Affirmative answer activated.
    Affirm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    DismissLoading,
    RevealLetter,
    /// Reduced motion: no animation end will arrive, fire `RevealFinished` after the fallback delay.
    ScheduleRevealFallback,
    StartIdleHearts,
    ShowContinue,
    ShowQuestion,
    ArmEvasion,
    StartQuestionHearts,
    DisarmEvasion,
    ShowCelebration,
    LaunchConfetti,
    BurstHearts,
}

#[derive(Debug)]
pub struct ScreenFlow {
    screen: Screen,
    reduced_motion: bool,
    letter_open: bool,
    continue_shown: bool,
}

impl ScreenFlow {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            screen: Screen::Loading,
            reduced_motion,
            letter_open: false,
            continue_shown: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn handle(&mut self, event: FlowEvent) -> Vec<Effect> {
        let motion = !self.reduced_motion;
        let mut effects = Vec::new();
        match (self.screen, event) {
            (Screen::Loading, FlowEvent::LoadingElapsed) => {
                self.screen = Screen::Letter;
                effects.push(Effect::DismissLoading);
            }
            (Screen::Letter, FlowEvent::OpenLetter) if !self.letter_open => {
                self.letter_open = true;
                effects.push(Effect::RevealLetter);
                if motion {
                    effects.push(Effect::StartIdleHearts);
                } else {
                    effects.push(Effect::ScheduleRevealFallback);
                }
            }
            (Screen::Letter, FlowEvent::RevealFinished)
                if self.letter_open && !self.continue_shown =>
            {
                self.continue_shown = true;
                effects.push(Effect::ShowContinue);
            }
            (Screen::Letter, FlowEvent::Continue) if self.continue_shown => {
                self.screen = Screen::Question;
                effects.push(Effect::ShowQuestion);
                effects.push(Effect::ArmEvasion);
                if motion {
                    effects.push(Effect::StartQuestionHearts);
                }
            }
            (Screen::Question, FlowEvent::Affirm) => {
                self.screen = Screen::Celebration;
                effects.push(Effect::DisarmEvasion);
                effects.push(Effect::ShowCelebration);
                if motion {
                    effects.push(Effect::LaunchConfetti);
                    effects.push(Effect::BurstHearts);
                }
            }
            _ => {}
        }
        effects
    }
}
