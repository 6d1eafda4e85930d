/// Sample resume text used when the PDF library cannot read the input.
/// Results built from it are always tagged `Provenance::Fallback`.
pub const SAMPLE_RESUME_TEXT: &str = "JOHN DOE
123 Main Street, City, State 12345
Phone: (123) 456-7890 | Email: john.doe@example.com | LinkedIn: linkedin.com/in/johndoe

PROFESSIONAL SUMMARY
Experienced software developer with expertise in JavaScript/TypeScript, React, Node.js, and AWS.
Passionate about creating efficient, scalable, and maintainable code. Strong problem-solving skills
and ability to work effectively in team environments.

SKILLS
- JavaScript/TypeScript
- React/Next.js
- Node.js
- AWS/Cloud Computing
- CI/CD Pipelines
- RESTful APIs
- MongoDB/PostgreSQL
- Git/GitHub

PROFESSIONAL EXPERIENCE

Senior Software Developer
ABC Company | 2020 - Present
- Developed and maintained web applications using React and Node.js
- Implemented CI/CD pipelines using GitHub Actions
- Deployed applications to AWS using Amplify
- Collaborated with cross-functional teams to deliver high-quality software
- Mentored junior developers and conducted code reviews

Software Developer
XYZ Company | 2018 - 2020
- Developed front-end applications using React
- Implemented RESTful APIs using Node.js
- Worked with MongoDB and PostgreSQL databases
- Participated in Agile development processes
- Contributed to open-source projects

EDUCATION

Bachelor of Science in Computer Science
University of Technology | 2014 - 2018
- GPA: 3.8/4.0
- Relevant coursework: Data Structures, Algorithms, Web Development, Database Systems

CERTIFICATIONS
- AWS Certified Developer - Associate
- MongoDB Certified Developer

PROJECTS
- Personal Portfolio: Developed a personal portfolio website using Next.js and Tailwind CSS
- Task Manager: Created a full-stack task management application with React, Node.js, and MongoDB
- Weather App: Built a weather application using React and OpenWeather API
";
