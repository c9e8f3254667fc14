// SPDX-License-Identifier: MIT

//! Conditional edges of the research graph

use super::state::{ResearchApproach, ResearchState};
use crate::researcher::workflow::graph::{RouteLabel, END};
use crate::researcher::workflow::state::non_blank;

/// Entry branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachRoute {
    TopicOnly,
    CompanyLeads,
}

impl RouteLabel for ApproachRoute {
    const ALL: &'static [Self] = &[ApproachRoute::TopicOnly, ApproachRoute::CompanyLeads];

    fn as_str(&self) -> &'static str {
        match self {
            ApproachRoute::TopicOnly => "topic_only_path",
            ApproachRoute::CompanyLeads => "company_leads_path",
        }
    }
}

/// Whether to analyze a video before the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRoute {
    AnalyzeVideo,
    CreateReport,
}

impl RouteLabel for VideoRoute {
    const ALL: &'static [Self] = &[VideoRoute::AnalyzeVideo, VideoRoute::CreateReport];

    fn as_str(&self) -> &'static str {
        match self {
            VideoRoute::AnalyzeVideo => "analyze_video",
            VideoRoute::CreateReport => "create_report",
        }
    }
}

/// Whether to produce a podcast after the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodcastRoute {
    CreatePodcast,
    Finish,
}

impl RouteLabel for PodcastRoute {
    const ALL: &'static [Self] = &[PodcastRoute::CreatePodcast, PodcastRoute::Finish];

    fn as_str(&self) -> &'static str {
        match self {
            PodcastRoute::CreatePodcast => "create_podcast",
            PodcastRoute::Finish => END,
        }
    }
}

/// Company research runs only when a company and at least one title were given;
/// otherwise a company-mode request falls back to topic-only research.
pub fn route_by_approach(state: &ResearchState) -> ApproachRoute {
    if state.research_approach != ResearchApproach::TopicCompanyLeads {
        return ApproachRoute::TopicOnly;
    }
    if non_blank(&state.company_name).is_none() || state.titles().is_empty() {
        log::warn!(
            "'Topic Company Leads' requested without company_name or title_areas; falling back to topic-only research"
        );
        return ApproachRoute::TopicOnly;
    }
    ApproachRoute::CompanyLeads
}

pub fn route_video(state: &ResearchState) -> VideoRoute {
    if non_blank(&state.video_url).is_some() {
        VideoRoute::AnalyzeVideo
    } else {
        VideoRoute::CreateReport
    }
}

pub fn route_podcast(state: &ResearchState) -> PodcastRoute {
    if state.create_podcast {
        PodcastRoute::CreatePodcast
    } else {
        PodcastRoute::Finish
    }
}
