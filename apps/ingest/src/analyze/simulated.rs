use crate::models::{Contact, Education, Experience, StructuredResume};

pub const SIMULATED_NAME: &str = "John Doe";

/// Canned profile returned whenever real analysis is unavailable.
pub fn simulated_resume() -> StructuredResume {
    StructuredResume {
        name: SIMULATED_NAME.to_string(),
        summary: "Experienced software developer with expertise in JavaScript/TypeScript, \
                  React, Node.js, and AWS."
            .to_string(),
        skills: [
            "JavaScript/TypeScript",
            "React",
            "Node.js",
            "AWS",
            "Next.js",
            "CI/CD",
            "RESTful APIs",
            "MongoDB",
            "PostgreSQL",
            "Git/GitHub",
            "Communication",
            "Teamwork",
            "Problem Solving",
        ]
        .map(String::from)
        .to_vec(),
        experience: vec![
            Experience {
                title: "Senior Software Developer".to_string(),
                company: "ABC Company".to_string(),
                period: "2020 - Present".to_string(),
                responsibilities: [
                    "Developed and maintained web applications using React and Node.js",
                    "Implemented CI/CD pipelines using GitHub Actions",
                    "Deployed applications to AWS using Amplify",
                    "Collaborated with cross-functional teams to deliver high-quality software",
                    "Mentored junior developers and conducted code reviews",
                ]
                .map(String::from)
                .to_vec(),
            },
            Experience {
                title: "Software Developer".to_string(),
                company: "XYZ Company".to_string(),
                period: "2018 - 2020".to_string(),
                responsibilities: [
                    "Developed front-end applications using React",
                    "Implemented RESTful APIs using Node.js",
                    "Worked with MongoDB and PostgreSQL databases",
                    "Participated in Agile development processes",
                    "Contributed to open-source projects",
                ]
                .map(String::from)
                .to_vec(),
            },
        ],
        education: vec![Education {
            degree: "Bachelor of Science in Computer Science".to_string(),
            institution: "University of Technology".to_string(),
            period: "2014 - 2018".to_string(),
        }],
        contact: Contact {
            email: Some("john.doe@example.com".to_string()),
            phone: Some("(123) 456-7890".to_string()),
            linkedin: Some("linkedin.com/in/johndoe".to_string()),
            ..Contact::default()
        },
    }
}
